//! Formdesk Services Library
//!
//! Outbound HTTP clients used by the API, each behind a trait so handlers and
//! tests can swap in another implementation:
//! - Helpdesk (attachment upload, ticket creation)
//! - Bot verification
//! - Geocoding

pub mod captcha;
pub mod error;
pub mod geocoding;
pub mod helpdesk;

pub use captcha::{BotVerifier, TurnstileVerifier};
pub use error::ServiceError;
pub use geocoding::{GeocodingApi, GeocodingClient};
pub use helpdesk::{HelpdeskApi, HelpdeskClient};
