use formdesk_core::models::{DecodedForm, RejectedFile, SubmittedFile};
use formdesk_services::HelpdeskApi;

use super::types::{UploadOutcome, UploadResult};

const UPLOAD_FAILED_REASON: &str = "Upload failed";

/// Upload every spooled file, one at a time in parse order.
///
/// A failed file is recorded as rejected and the loop moves on; nothing here
/// aborts the submission.
pub async fn upload_all(helpdesk: &dyn HelpdeskApi, form: &DecodedForm) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();
    for file in form.iter_files() {
        outcome.record(upload_one(helpdesk, file).await);
    }

    if !outcome.rejected.is_empty() {
        tracing::warn!(
            uploaded = outcome.attachments.len(),
            rejected = outcome.rejected.len(),
            "Some attachments could not be uploaded"
        );
    }
    outcome
}

async fn upload_one(helpdesk: &dyn HelpdeskApi, file: &SubmittedFile) -> UploadResult {
    match helpdesk.upload_attachment(file).await {
        Ok(descriptor) => UploadResult::Uploaded(descriptor),
        Err(e) => {
            tracing::warn!(error = %e, size = file.size, "Attachment upload failed");
            UploadResult::Failed(RejectedFile {
                name: file.filename.clone(),
                reason: UPLOAD_FAILED_REASON.to_string(),
            })
        }
    }
}
