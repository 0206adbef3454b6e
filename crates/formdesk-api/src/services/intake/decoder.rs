//! Multipart decoding
//!
//! Text parts become first-value string fields. Parts with a filename are
//! streamed chunk by chunk into temporary files with the count, size and MIME
//! filters applied during the stream. Files dropped by the MIME filter do not
//! count toward the file limit.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use formdesk_core::config::IntakeConfig;
use formdesk_core::models::{DecodedForm, SubmittedFile};
use formdesk_core::AppError;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Decode every part into `form`.
///
/// Files already spooled stay in `form` when decoding fails part-way, so the
/// caller's cleanup sees them.
pub async fn decode_multipart(
    multipart: &mut Multipart,
    limits: &IntakeConfig,
    form: &mut DecodedForm,
) -> Result<(), AppError> {
    let mut file_parts = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) if !filename.trim().is_empty() => {
                let content_type = field
                    .content_type()
                    .map(normalize_mime_type)
                    .filter(|ct| !ct.is_empty());

                if !is_allowed_type(content_type.as_deref(), &limits.allowed_file_types) {
                    tracing::debug!(
                        content_type = content_type.as_deref().unwrap_or("none"),
                        "Dropping file with disallowed type"
                    );
                    continue;
                }

                file_parts += 1;
                if file_parts > limits.max_files {
                    return Err(AppError::InvalidInput("Too many files".to_string()));
                }

                if let Some(file) =
                    spool_file(field, name, filename, content_type, limits).await?
                {
                    form.push_file(file);
                }
            }
            Some(_) => {
                // empty file input
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                form.insert_field(name, value);
            }
        }
    }

    tracing::debug!(
        fields = form.fields.len(),
        files = form.file_count(),
        "Multipart body decoded"
    );
    Ok(())
}

/// Stream one file part to disk. Returns `None` for a zero-byte file.
async fn spool_file(
    mut field: Field<'_>,
    field_name: String,
    filename: String,
    content_type: Option<String>,
    limits: &IntakeConfig,
) -> Result<Option<SubmittedFile>, AppError> {
    let max_bytes = limits.max_file_size_bytes;
    let temp = new_temp_file(limits.temp_dir.as_deref())?;
    let mut writer = tokio::fs::File::from_std(temp.reopen()?);
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        if size > max_bytes as u64 {
            return Err(AppError::InvalidInput("File too large".to_string()));
        }
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;

    if size == 0 {
        return Ok(None);
    }

    Ok(Some(SubmittedFile::new(
        field_name,
        filename,
        content_type,
        size,
        temp,
    )))
}

fn new_temp_file(dir: Option<&Path>) -> std::io::Result<NamedTempFile> {
    match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
}

/// Strip parameters and case: `Image/PNG; q=1` becomes `image/png`.
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn is_allowed_type(content_type: Option<&str>, allowed: &[String]) -> bool {
    content_type.is_some_and(|ct| allowed.iter().any(|a| a == ct))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::InvalidInput("Request body too large".to_string())
    } else {
        AppError::Internal(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};

    const BOUNDARY: &str = "formdesk-test-boundary";

    enum TestPart<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str, &'a [u8]),
    }

    async fn multipart(parts: &[TestPart<'_>]) -> Multipart {
        let mut body: Vec<u8> = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                TestPart::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                TestPart::File(name, filename, content_type, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn limits() -> IntakeConfig {
        IntakeConfig {
            max_files: 3,
            max_file_size_bytes: 16,
            ..IntakeConfig::default()
        }
    }

    #[tokio::test]
    async fn first_text_value_wins_and_files_are_spooled() {
        let mut mp = multipart(&[
            TestPart::Text("formType", "contact-form"),
            TestPart::Text("name", "Jane"),
            TestPart::Text("name", "Ignored"),
            TestPart::File("files", "a.txt", "text/plain", b"hello"),
        ])
        .await;
        let mut form = DecodedForm::default();
        decode_multipart(&mut mp, &limits(), &mut form).await.unwrap();

        assert_eq!(form.fields["name"], "Jane");
        assert_eq!(form.file_count(), 1);
        let file = form.iter_files().next().unwrap();
        assert_eq!(file.filename, "a.txt");
        assert_eq!(file.size, 5);
        assert_eq!(std::fs::read(file.path()).unwrap(), b"hello");
        form.cleanup();
    }

    #[tokio::test]
    async fn disallowed_types_are_dropped_silently() {
        let mut mp = multipart(&[
            TestPart::File("files", "run.exe", "application/x-msdownload", b"MZ"),
            TestPart::File("files", "ok.PNG", "IMAGE/PNG; foo=bar", b"png"),
        ])
        .await;
        let mut form = DecodedForm::default();
        decode_multipart(&mut mp, &limits(), &mut form).await.unwrap();

        let names: Vec<_> = form.iter_files().map(|f| f.filename.clone()).collect();
        assert_eq!(names, vec!["ok.PNG"]);
        assert_eq!(
            form.iter_files().next().unwrap().content_type.as_deref(),
            Some("image/png")
        );
        form.cleanup();
    }

    #[tokio::test]
    async fn oversized_file_fails_the_parse() {
        let mut mp = multipart(&[TestPart::File(
            "files",
            "big.txt",
            "text/plain",
            b"this is well over sixteen bytes",
        )])
        .await;
        let mut form = DecodedForm::default();
        let err = decode_multipart(&mut mp, &limits(), &mut form).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "File too large"));
        assert_eq!(form.file_count(), 0);
    }

    #[tokio::test]
    async fn too_many_files_keeps_spooled_ones_for_cleanup() {
        let mut mp = multipart(&[
            TestPart::File("files", "1.txt", "text/plain", b"1"),
            TestPart::File("files", "2.txt", "text/plain", b"2"),
            TestPart::File("files", "3.txt", "text/plain", b"3"),
            TestPart::File("files", "4.txt", "text/plain", b"4"),
        ])
        .await;
        let mut form = DecodedForm::default();
        let err = decode_multipart(&mut mp, &limits(), &mut form).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Too many files"));

        let paths: Vec<_> = form.iter_files().map(|f| f.path().to_path_buf()).collect();
        assert_eq!(paths.len(), 3);
        assert_eq!(form.cleanup(), 0);
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn files_are_spooled_into_configured_dir() {
        let scratch = tempfile::TempDir::new().unwrap();
        let limits = IntakeConfig {
            temp_dir: Some(scratch.path().to_path_buf()),
            ..limits()
        };
        let mut mp = multipart(&[TestPart::File("files", "a.txt", "text/plain", b"abc")]).await;
        let mut form = DecodedForm::default();
        decode_multipart(&mut mp, &limits, &mut form).await.unwrap();

        let path = form.iter_files().next().unwrap().path().to_path_buf();
        assert!(path.starts_with(scratch.path()));
        assert_eq!(form.cleanup(), 0);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn dropped_types_do_not_count_toward_file_limit() {
        let mut mp = multipart(&[
            TestPart::File("files", "a.exe", "application/x-msdownload", b"MZ"),
            TestPart::File("files", "b.exe", "application/x-msdownload", b"MZ"),
            TestPart::File("files", "1.txt", "text/plain", b"1"),
            TestPart::File("files", "2.txt", "text/plain", b"2"),
            TestPart::File("files", "3.txt", "text/plain", b"3"),
        ])
        .await;
        let mut form = DecodedForm::default();
        decode_multipart(&mut mp, &limits(), &mut form).await.unwrap();

        let names: Vec<_> = form.iter_files().map(|f| f.filename.clone()).collect();
        assert_eq!(names, vec!["1.txt", "2.txt", "3.txt"]);
        form.cleanup();
    }

    #[tokio::test]
    async fn empty_files_and_blank_filenames_are_ignored() {
        let mut mp = multipart(&[
            TestPart::File("files", "empty.txt", "text/plain", b""),
            TestPart::File("files", "", "text/plain", b""),
            TestPart::Text("email", "a@b.co"),
        ])
        .await;
        let mut form = DecodedForm::default();
        decode_multipart(&mut mp, &limits(), &mut form).await.unwrap();
        assert_eq!(form.file_count(), 0);
        assert_eq!(form.fields["email"], "a@b.co");
    }
}
