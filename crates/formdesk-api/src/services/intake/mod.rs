//! Form intake pipeline
//!
//! decode -> validate -> render -> upload -> submit. The HTTP handler owns the
//! decoded form and releases its temporary files whatever the outcome.

pub mod decoder;
pub mod renderer;
pub mod submitter;
pub mod templates;
pub mod types;
pub mod uploader;
pub mod validator;

use formdesk_core::models::{DecodedForm, SubmissionReceipt};
use formdesk_core::AppError;
use formdesk_services::HelpdeskApi;

use crate::state::AppState;
use submitter::TicketDraft;

/// Everything after decoding: field validation, bot check, rendering, uploads
/// and ticket creation.
pub async fn process_submission(
    state: &AppState,
    helpdesk: &dyn HelpdeskApi,
    support_email: &str,
    form: &DecodedForm,
    client_ip: &str,
) -> Result<SubmissionReceipt, AppError> {
    let submission = validator::validate_fields(&form.fields, &state.config.intake)?;
    validator::verify_bot(state.bot_verifier.as_deref(), &form.fields, client_ip).await?;

    let body_html = renderer::render_body(&state.templates, &submission);
    let uploads = uploader::upload_all(helpdesk, form).await;

    let integration_id = state
        .config
        .helpdesk
        .routing
        .get(submission.form_type())
        .copied();

    let files_uploaded = uploads.attachments.len();
    let payload = submitter::build_payload(TicketDraft {
        submission: &submission,
        body_html,
        attachments: uploads.attachments,
        support_email,
        integration_id,
    });

    let created = submitter::submit(helpdesk, &payload).await?;

    tracing::info!(
        ticket_id = created.id,
        form_type = %submission.form_type(),
        files_uploaded,
        files_rejected = uploads.rejected.len(),
        "Ticket created"
    );

    Ok(SubmissionReceipt {
        success: true,
        ticket_id: created.id,
        files_uploaded,
        files_rejected: uploads.rejected.len(),
        rejected_files: uploads.rejected,
    })
}
