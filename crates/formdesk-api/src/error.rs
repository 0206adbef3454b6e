//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; any `AppError`
//! converts with `?` and renders as `{ "error", "code" }` with the variant's status.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use formdesk_core::{AppError, ErrorMetadata, LogLevel};
use formdesk_services::ServiceError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: both the trait and `AppError` are foreign to this crate).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Map an outbound client failure onto the upstream-failure variant for `service`.
pub fn upstream_error(service: &'static str, err: ServiceError) -> AppError {
    match err {
        ServiceError::NotConfigured(what) => {
            AppError::ServerMisconfiguration(format!("{what} missing"))
        }
        other => AppError::UpstreamFailure {
            service,
            detail: other.to_string(),
        },
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let detail = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %detail, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %detail, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %detail, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = app_error.retry_after_secs() {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = HttpAppError(AppError::RateLimited {
            retry_after_secs: 42,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = upstream_error(
            "ticketing",
            ServiceError::Status {
                status: 500,
                body: "acme.gorgias.com exploded".into(),
            },
        );
        assert_eq!(err.http_status_code(), 502);
        assert!(!err.client_message().contains("gorgias"));
    }

    #[test]
    fn missing_credentials_map_to_misconfiguration() {
        let err = upstream_error("ticketing", ServiceError::NotConfigured("helpdesk API key"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Server configuration error");
    }
}
