//! Error types module
//!
//! All request-level failures are unified under the `AppError` enum. Each variant
//! self-describes its HTTP presentation through the `ErrorMetadata` trait so the
//! API layer can render responses without matching on variants itself.
//!
//! Per-file upload failures are deliberately absent: they never abort a submission
//! and are reported through the rejected-file list of a successful response.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for refused requests (origin, rate limit, bot check)
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "RATE_LIMITED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (never contains upstream bodies or credentials)
    fn client_message(&self) -> String;

    /// Whether the internal message must stay server-side
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Upstream {service} failure: {detail}")]
    UpstreamFailure {
        service: &'static str,
        detail: String,
    },

    #[error("Server misconfiguration: {0}")]
    ServerMisconfiguration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Warn),
        AppError::RateLimited { .. } => (429, "RATE_LIMITED", false, LogLevel::Warn),
        AppError::MethodNotAllowed => (405, "METHOD_NOT_ALLOWED", false, LogLevel::Debug),
        AppError::UpstreamFailure { .. } => (502, "UPSTREAM_FAILURE", true, LogLevel::Error),
        AppError::ServerMisconfiguration(_) => {
            (500, "SERVER_MISCONFIGURATION", true, LogLevel::Error)
        }
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for log lines
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Forbidden(_) => "Forbidden",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::MethodNotAllowed => "MethodNotAllowed",
            AppError::UpstreamFailure { .. } => "UpstreamFailure",
            AppError::ServerMisconfiguration(_) => "ServerMisconfiguration",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Seconds a rate-limited client should wait, if this is a rate-limit error
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::RateLimited { .. } => "Too many requests. Please slow down.".to_string(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::UpstreamFailure { service, .. } => {
                format!("Failed to reach {} service", service)
            }
            AppError::ServerMisconfiguration(_) => "Server configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
