use formdesk_core::models::{AttachmentDescriptor, RejectedFile};

/// Result of pushing one file to the helpdesk. Failures never abort the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Uploaded(AttachmentDescriptor),
    Failed(RejectedFile),
}

/// Attachments that made it and files that did not, each in parse order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOutcome {
    pub attachments: Vec<AttachmentDescriptor>,
    pub rejected: Vec<RejectedFile>,
}

impl UploadOutcome {
    pub fn record(&mut self, result: UploadResult) {
        match result {
            UploadResult::Uploaded(descriptor) => self.attachments.push(descriptor),
            UploadResult::Failed(rejected) => self.rejected.push(rejected),
        }
    }
}

/// Customer identity resolved from whichever name fields the form carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerName {
    pub full: String,
    pub first: String,
    pub last: String,
}
