use formdesk_core::models::{AttachmentDescriptor, SubmittedFile};
use serde::Deserialize;

use crate::ServiceError;

/// One stored file as echoed by the upload endpoint. Only `url` is guaranteed.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAttachment {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// The upload endpoint answers with either a bare object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UploadResponse {
    Many(Vec<UploadedAttachment>),
    One(UploadedAttachment),
}

impl UploadResponse {
    /// Normalize against the local file, filling gaps the service left out.
    pub(crate) fn into_descriptor(
        self,
        file: &SubmittedFile,
    ) -> Result<AttachmentDescriptor, ServiceError> {
        let uploaded = match self {
            UploadResponse::One(item) => item,
            UploadResponse::Many(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| ServiceError::Decode("empty upload response list".to_string()))?,
        };

        if uploaded.url.trim().is_empty() {
            return Err(ServiceError::Decode("upload response without url".to_string()));
        }

        Ok(AttachmentDescriptor {
            url: uploaded.url,
            name: uploaded
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| file.filename.clone()),
            size: uploaded.size.unwrap_or(file.size),
            content_type: uploaded
                .content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| file.content_type_or_default().to_string()),
        })
    }
}
