pub mod geocode;
pub mod health;
pub mod tickets;

use crate::error::HttpAppError;
use formdesk_core::AppError;

/// Fallback for methods a route does not serve.
pub async fn method_not_allowed() -> HttpAppError {
    HttpAppError(AppError::MethodNotAllowed)
}
