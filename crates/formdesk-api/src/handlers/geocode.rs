//! Postal-code lookup proxy
//!
//! Keeps the geocoding key server-side and trims the provider response down to
//! address components.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use formdesk_core::validation::is_valid_postal_code;
use formdesk_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{upstream_error, HttpAppError};
use crate::services::intake::validator;
use crate::state::AppState;
use crate::utils::{extract_client_ip, ClientAddr};

pub const RATE_LIMIT_SCOPE: &str = "geocode";
const CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeQuery {
    pub postal_code: Option<String>,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    ClientAddr(socket): ClientAddr,
    headers: HeaderMap,
    Query(query): Query<GeocodeQuery>,
) -> Result<Response, HttpAppError> {
    validator::check_origin(&headers, &state.config.server.allowed_origins)?;

    let client_ip = extract_client_ip(
        &headers,
        socket.as_ref(),
        state.config.server.trusted_proxy_count,
    );
    validator::enforce_rate_limit(
        state.rate_limiter.as_ref(),
        RATE_LIMIT_SCOPE,
        &client_ip,
        state.config.rate_limit.geocode_limit_per_window,
    )
    .await?;

    let postal_code = query
        .postal_code
        .as_deref()
        .map(str::trim)
        .filter(|code| is_valid_postal_code(code))
        .ok_or_else(|| AppError::InvalidInput("Invalid postal code".to_string()))?;

    let geocoder = state.geocoder.as_ref().ok_or_else(|| {
        AppError::ServerMisconfiguration("geocoding API key is not configured".to_string())
    })?;

    let results = geocoder
        .lookup(postal_code)
        .await
        .map_err(|e| upstream_error("geocoding", e))?;

    let mut response = Json(results).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    Ok(response)
}
