//! Exact-match origin CORS
//!
//! Allow-listed origins get the CORS headers echoed back; any other origin gets
//! none. Preflights are answered here with 204 (403 for an unlisted origin) and
//! never reach the route handler.

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use formdesk_core::AppError;
use std::sync::Arc;

use crate::error::HttpAppError;

const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

pub fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    !origin.is_empty() && allowed_origins.iter().any(|allowed| allowed == origin)
}

/// CORS settings for one route.
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    pub allowed_origins: Arc<Vec<String>>,
    pub allow_methods: &'static str,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Arc<Vec<String>>, allow_methods: &'static str) -> Self {
        Self {
            allowed_origins,
            allow_methods,
        }
    }

    /// The request's origin, when it is on the allow-list.
    fn allowed_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        let value = headers.get(header::ORIGIN)?;
        let origin = value.to_str().ok()?;
        is_origin_allowed(origin, &self.allowed_origins).then(|| value.clone())
    }

    fn apply(&self, headers: &mut HeaderMap, origin: HeaderValue) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
        );
    }
}

pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = policy.allowed_origin(request.headers());

    if request.method() == Method::OPTIONS {
        return match origin {
            Some(origin) => {
                let mut response = StatusCode::NO_CONTENT.into_response();
                policy.apply(response.headers_mut(), origin);
                response
            }
            None => {
                HttpAppError(AppError::Forbidden("Origin not allowed".to_string())).into_response()
            }
        };
    }

    let mut response = next.run(request).await;
    if let Some(origin) = origin {
        policy.apply(response.headers_mut(), origin);
    }
    response
}
