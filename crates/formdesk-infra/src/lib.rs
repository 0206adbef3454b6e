//! Formdesk Infrastructure Library
//!
//! Shared infrastructure used by the API:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Rate limiting

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{spawn_sweeper, InMemoryRateLimitStore, RateDecision, RateLimitStore};
