//! Ticket creation endpoint
//!
//! Origin and rate limit are checked before the body is read. Temporary files
//! produced while decoding are released on every exit path; `NamedTempFile`
//! drop covers unwinding.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formdesk_core::models::{DecodedForm, SubmissionReceipt};
use formdesk_core::AppError;
use formdesk_services::HelpdeskApi;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::services::intake::{self, decoder, validator};
use crate::state::AppState;
use crate::utils::{extract_client_ip, ClientAddr};

pub const RATE_LIMIT_SCOPE: &str = "tickets";

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    ClientAddr(socket): ClientAddr,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
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
        state.config.rate_limit.ticket_limit_per_window,
    )
    .await?;

    let helpdesk = state.helpdesk.clone().ok_or_else(|| {
        AppError::ServerMisconfiguration("helpdesk credentials are not configured".to_string())
    })?;
    let support_email = state
        .config
        .helpdesk
        .support_email
        .clone()
        .ok_or_else(|| {
            AppError::ServerMisconfiguration("helpdesk support email is not configured".to_string())
        })?;

    let mut multipart = multipart
        .map_err(|_| AppError::InvalidInput("Expected multipart form data".to_string()))?;

    let mut form = DecodedForm::default();
    let outcome = run_pipeline(
        &state,
        helpdesk.as_ref(),
        &support_email,
        &mut multipart,
        &mut form,
        &client_ip,
    )
    .await;

    let spooled = form.file_count();
    let leaked = form.cleanup();
    if leaked > 0 {
        tracing::warn!(spooled, leaked, "Temporary uploads could not all be removed");
    }

    let receipt = outcome?;
    Ok(Json(receipt).into_response())
}

async fn run_pipeline(
    state: &AppState,
    helpdesk: &dyn HelpdeskApi,
    support_email: &str,
    multipart: &mut Multipart,
    form: &mut DecodedForm,
    client_ip: &str,
) -> Result<SubmissionReceipt, AppError> {
    decoder::decode_multipart(multipart, &state.config.intake, form).await?;
    intake::process_submission(state, helpdesk, support_email, form, client_ip).await
}
