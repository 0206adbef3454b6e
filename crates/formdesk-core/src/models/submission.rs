//! Decoded and validated form submissions.

use indexmap::IndexMap;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Control fields consumed by the pipeline; never rendered as ticket content.
pub const RESERVED_FIELDS: &[&str] = &[
    "formType",
    "tags",
    "subject",
    "customSubject",
    "integrationId",
    "captchaToken",
    "cf-turnstile-response",
    "g-recaptcha-response",
];

/// Fields that may carry a bot-verification token, in lookup order.
pub const BOT_TOKEN_FIELDS: &[&str] = &["captchaToken", "cf-turnstile-response", "g-recaptcha-response"];

pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// One uploaded file spooled to temporary storage.
///
/// The temporary file is removed when the handle is released or dropped, so a
/// submission that unwinds half-way still leaves nothing behind.
#[derive(Debug)]
pub struct SubmittedFile {
    pub field_name: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    temp: NamedTempFile,
}

impl SubmittedFile {
    pub fn new(
        field_name: String,
        filename: String,
        content_type: Option<String>,
        size: u64,
        temp: NamedTempFile,
    ) -> Self {
        Self {
            field_name,
            filename,
            content_type,
            size,
            temp,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Declared MIME type, or `application/octet-stream` when the client sent none.
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or("application/octet-stream")
    }

    /// Open the spooled bytes for a single streaming read.
    pub async fn open(&self) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.temp.path()).await
    }

    /// Delete the temporary file, reporting the failure instead of ignoring it.
    pub fn release(self) -> io::Result<()> {
        self.temp.close()
    }
}

/// Result of the multipart decoder: first-value text fields and spooled files,
/// both in the order the client sent them.
#[derive(Debug, Default)]
pub struct DecodedForm {
    pub fields: IndexMap<String, String>,
    pub files: Vec<SubmittedFile>,
}

impl DecodedForm {
    /// Keep the first occurrence of a text field; later duplicates are dropped.
    pub fn insert_field(&mut self, name: String, value: String) {
        self.fields.entry(name).or_insert(value);
    }

    pub fn push_file(&mut self, file: SubmittedFile) {
        self.files.push(file);
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Files in arrival order, whatever field carried them.
    pub fn iter_files(&self) -> impl Iterator<Item = &SubmittedFile> {
        self.files.iter()
    }

    /// Release every temporary file. Deletion errors are logged and swallowed.
    /// Returns the number of files that could not be removed.
    pub fn cleanup(self) -> usize {
        let mut failures = 0;
        for file in self.files {
            let path = file.path().to_path_buf();
            if let Err(e) = file.release() {
                failures += 1;
                tracing::debug!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove temporary upload"
                );
            }
        }
        failures
    }
}

/// A submission that passed every validation step. Read-only once built.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    form_type: String,
    email: String,
    subject: Option<String>,
    fields: IndexMap<String, String>,
}

impl ValidatedSubmission {
    /// `subject` must already be sanitized.
    pub fn new(
        form_type: String,
        email: String,
        subject: Option<String>,
        fields: IndexMap<String, String>,
    ) -> Self {
        Self {
            form_type,
            email,
            subject,
            fields,
        }
    }

    pub fn form_type(&self) -> &str {
        &self.form_type
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Sanitized client subject, if one was supplied.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Trimmed, non-empty value of a field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
