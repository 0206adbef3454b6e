use async_trait::async_trait;
use formdesk_core::config::HelpdeskConfig;
use formdesk_core::models::{AttachmentDescriptor, SubmittedFile, TicketCreated, TicketPayload};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use tokio_util::io::ReaderStream;

use super::types::UploadResponse;
use crate::ServiceError;

/// Operations the intake pipeline needs from the helpdesk.
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// Stream one spooled file to the attachment store. Single attempt, no retry.
    async fn upload_attachment(
        &self,
        file: &SubmittedFile,
    ) -> Result<AttachmentDescriptor, ServiceError>;

    async fn create_ticket(&self, payload: &TicketPayload) -> Result<TicketCreated, ServiceError>;
}

/// reqwest-backed helpdesk client using Basic authentication.
#[derive(Clone)]
pub struct HelpdeskClient {
    http_client: Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl Debug for HelpdeskClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HelpdeskClient").finish_non_exhaustive()
    }
}

impl HelpdeskClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client when the base URL and both credentials are present.
    pub fn from_config(config: &HelpdeskConfig) -> Result<Self, ServiceError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("helpdesk base URL"))?;
        let username = config
            .username
            .as_deref()
            .ok_or(ServiceError::NotConfigured("helpdesk username"))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(ServiceError::NotConfigured("helpdesk API key"))?;

        Self::new(
            base_url,
            username,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl HelpdeskApi for HelpdeskClient {
    async fn upload_attachment(
        &self,
        file: &SubmittedFile,
    ) -> Result<AttachmentDescriptor, ServiceError> {
        let handle = file.open().await?;
        let body = Body::wrap_stream(ReaderStream::new(handle));
        let part = Part::stream_with_length(body, file.size)
            .file_name(file.filename.clone())
            .mime_str(file.content_type_or_default())?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url("/api/upload"))
            .query(&[("type", "attachment")])
            .basic_auth(&self.username, Some(&self.api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        let descriptor = parsed.into_descriptor(file)?;

        tracing::debug!(
            size = descriptor.size,
            content_type = %descriptor.content_type,
            "Attachment uploaded"
        );
        Ok(descriptor)
    }

    async fn create_ticket(&self, payload: &TicketPayload) -> Result<TicketCreated, ServiceError> {
        let response = self
            .http_client
            .post(self.url("/api/tickets"))
            .basic_auth(&self.username, Some(&self.api_key))
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }

        response
            .json::<TicketCreated>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdesk_core::models::{
        MessageSource, Party, TicketCustomer, TicketMessage, TicketTag, TICKET_CHANNEL,
        TICKET_STATUS_OPEN, TICKET_VIA,
    };
    use mockito::Matcher;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn client_for(server: &mockito::Server) -> HelpdeskClient {
        HelpdeskClient::new(server.url(), "agent@example.com", "secret-key", Duration::from_secs(5))
            .unwrap()
    }

    fn spooled(name: &str, bytes: &[u8]) -> SubmittedFile {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(bytes).unwrap();
        SubmittedFile::new(
            "files".into(),
            name.into(),
            Some("text/plain".into()),
            bytes.len() as u64,
            temp,
        )
    }

    fn payload() -> TicketPayload {
        let customer = Party {
            email: "jane@example.com".into(),
            name: Some("Jane Doe".into()),
        };
        let support = Party {
            email: "support@example.com".into(),
            name: None,
        };
        TicketPayload {
            channel: TICKET_CHANNEL.into(),
            via: TICKET_VIA.into(),
            customer: TicketCustomer {
                email: "jane@example.com".into(),
                name: "Jane Doe".into(),
                firstname: "Jane".into(),
                lastname: "Doe".into(),
            },
            subject: "Contact Form from Jane Doe".into(),
            messages: vec![TicketMessage {
                channel: TICKET_CHANNEL.into(),
                via: TICKET_VIA.into(),
                from_agent: false,
                sender: customer.clone(),
                receiver: support.clone(),
                source: MessageSource {
                    kind: "email".into(),
                    from: customer,
                    to: vec![support],
                },
                subject: "Contact Form from Jane Doe".into(),
                body_html: "<p>hi</p>".into(),
                attachments: vec![],
                integration_id: None,
            }],
            tags: vec![TicketTag {
                name: "contact-form".into(),
            }],
            status: TICKET_STATUS_OPEN.into(),
        }
    }

    #[tokio::test]
    async fn upload_streams_file_with_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // base64("agent@example.com:secret-key")
        let mock = server
            .mock("POST", "/api/upload")
            .match_query(Matcher::UrlEncoded("type".into(), "attachment".into()))
            .match_header(
                "authorization",
                "Basic YWdlbnRAZXhhbXBsZS5jb206c2VjcmV0LWtleQ==",
            )
            .match_body(Matcher::Regex("notes\\.txt".into()))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"url":"https://files.example/notes.txt","name":"notes.txt","size":5,"content_type":"text/plain"}]"#)
            .expect(1)
            .create_async()
            .await;

        let file = spooled("notes.txt", b"hello");
        let descriptor = client_for(&server).upload_attachment(&file).await.unwrap();

        assert_eq!(descriptor.url, "https://files.example/notes.txt");
        assert_eq!(descriptor.size, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_failure_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("storage offline")
            .create_async()
            .await;

        let file = spooled("notes.txt", b"hello");
        let err = client_for(&server).upload_attachment(&file).await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn create_ticket_posts_json_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tickets")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "channel": "email",
                "via": "api",
                "status": "open",
                "customer": { "email": "jane@example.com" },
                "tags": [{ "name": "contact-form" }]
            })))
            .with_status(201)
            .with_body(r#"{"id": 8812, "uri": "/api/tickets/8812"}"#)
            .expect(1)
            .create_async()
            .await;

        let created = client_for(&server).create_ticket(&payload()).await.unwrap();
        assert_eq!(created.id, 8812);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_ticket_rejection_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/tickets")
            .with_status(422)
            .with_body(r#"{"error":"bad customer"}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_ticket(&payload()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { status: 422, .. }));
    }

    #[test]
    fn from_config_requires_credentials() {
        let config = HelpdeskConfig {
            base_url: Some("https://acme.gorgias.com".into()),
            username: None,
            api_key: Some("k".into()),
            ..HelpdeskConfig::default()
        };
        assert!(matches!(
            HelpdeskClient::from_config(&config),
            Err(ServiceError::NotConfigured(_))
        ));
    }
}
