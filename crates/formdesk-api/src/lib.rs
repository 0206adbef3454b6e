//! Formdesk API Library
//!
//! HTTP handlers, middleware and application setup for the form intake service.

mod handlers;
mod middleware;
mod utils;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::{setup_routes, CREATE_TICKET_PATH, GEOCODE_PATH};
pub use setup::{build_state, initialize_app};
pub use state::AppState;
