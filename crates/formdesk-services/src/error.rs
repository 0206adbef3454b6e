use thiserror::Error;

/// Failure talking to a third-party API.
///
/// Messages may include upstream status codes and bodies; they are for server
/// logs only and are never forwarded to the browser.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected upstream response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Build a `Status` error from a non-success response, keeping a bounded
    /// prefix of the body for diagnostics.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let body: String = body.chars().take(500).collect();
        ServiceError::Status { status, body }
    }
}
