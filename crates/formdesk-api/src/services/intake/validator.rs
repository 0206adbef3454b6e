//! Request and field validation, applied in a fixed order that stops at the
//! first failure: origin, rate limit, required fields, form type, email shape,
//! field lengths, subject sanitization, then bot verification.

use axum::http::{header, HeaderMap};
use formdesk_core::config::IntakeConfig;
use formdesk_core::models::{ValidatedSubmission, BOT_TOKEN_FIELDS};
use formdesk_core::validation::{is_valid_email, sanitize_subject, within_length};
use formdesk_core::AppError;
use formdesk_infra::rate_limit::{RateDecision, RateLimitStore};
use formdesk_services::BotVerifier;
use indexmap::IndexMap;

use crate::middleware::cors::is_origin_allowed;
use crate::utils::UNKNOWN_CLIENT;

/// Require an `Origin` header on the allow-list and return it.
pub fn check_origin(headers: &HeaderMap, allowed_origins: &[String]) -> Result<String, AppError> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if is_origin_allowed(origin, allowed_origins) {
        Ok(origin.to_string())
    } else {
        Err(AppError::Forbidden("Origin not allowed".to_string()))
    }
}

/// Count one request for `client_ip` under `scope` and reject once over `limit`.
pub async fn enforce_rate_limit(
    store: &dyn RateLimitStore,
    scope: &str,
    client_ip: &str,
    limit: u32,
) -> Result<(), AppError> {
    let key = format!("{scope}:{client_ip}");
    match store.hit(&key, limit).await {
        RateDecision::Allowed { .. } => Ok(()),
        RateDecision::Limited { retry_after } => {
            tracing::warn!(scope = %scope, client_ip = %client_ip, "Rate limit exceeded");
            Err(AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            })
        }
    }
}

/// Check decoded text fields and build the read-only submission.
pub fn validate_fields(
    fields: &IndexMap<String, String>,
    intake: &IntakeConfig,
) -> Result<ValidatedSubmission, AppError> {
    let form_type = non_blank(fields, "formType");
    let email = non_blank(fields, "email");
    let (Some(form_type), Some(email)) = (form_type, email) else {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    };

    if !intake.allowed_form_types.iter().any(|t| t == form_type) {
        return Err(AppError::InvalidInput("Invalid form type".to_string()));
    }

    if !is_valid_email(email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }

    if fields
        .values()
        .any(|value| !within_length(value, intake.max_field_length))
    {
        return Err(AppError::InvalidInput("Input too long".to_string()));
    }

    let subject = non_blank(fields, "subject")
        .or_else(|| non_blank(fields, "customSubject"))
        .map(sanitize_subject)
        .filter(|s| !s.is_empty());

    Ok(ValidatedSubmission::new(
        form_type.to_string(),
        email.to_string(),
        subject,
        fields.clone(),
    ))
}

/// Run bot verification when both a verifier and a token are present.
///
/// Only an explicit rejection blocks the submission. A verifier that errors or
/// cannot be reached lets the request through.
pub async fn verify_bot(
    verifier: Option<&dyn BotVerifier>,
    fields: &IndexMap<String, String>,
    client_ip: &str,
) -> Result<(), AppError> {
    let Some(verifier) = verifier else {
        return Ok(());
    };
    let Some(token) = BOT_TOKEN_FIELDS.iter().find_map(|name| non_blank(fields, name)) else {
        return Ok(());
    };

    let remote_ip = (client_ip != UNKNOWN_CLIENT).then_some(client_ip);
    match verifier.verify(token, remote_ip).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::Forbidden("Bot verification failed".to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Bot verification unavailable, continuing");
            Ok(())
        }
    }
}

fn non_blank<'a>(fields: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
