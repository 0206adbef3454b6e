//! Bot verification (Turnstile-compatible `siteverify` endpoint)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ServiceError;

/// Yes/no gate backed by a third-party challenge service.
///
/// `Ok(false)` means the service rejected the token. `Err` means the service
/// could not give an answer; callers decide whether that blocks the request.
#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, ServiceError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct TurnstileVerifier {
    http_client: Client,
    verify_url: String,
    secret: String,
}

impl TurnstileVerifier {
    pub fn new(verify_url: impl Into<String>, secret: impl Into<String>) -> Result<Self, ServiceError> {
        let http_client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http_client,
            verify_url: verify_url.into(),
            secret: secret.into(),
        })
    }
}

#[async_trait]
impl BotVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, ServiceError> {
        let response = self
            .http_client
            .post(&self.verify_url)
            .json(&VerifyRequest {
                secret: &self.secret,
                response: token,
                remoteip: remote_ip.filter(|ip| *ip != "unknown"),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }

        let verdict: VerifyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        if !verdict.success {
            tracing::debug!(error_codes = ?verdict.error_codes, "Bot verification rejected token");
        }
        Ok(verdict.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn accepted_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/siteverify")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "secret": "s3cret",
                "response": "tok",
                "remoteip": "203.0.113.9"
            })))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .expect(1)
            .create_async()
            .await;

        let verifier =
            TurnstileVerifier::new(format!("{}/siteverify", server.url()), "s3cret").unwrap();
        assert!(verifier.verify("tok", Some("203.0.113.9")).await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/siteverify")
            .with_status(200)
            .with_body(r#"{"success": false, "error-codes": ["invalid-input-response"]}"#)
            .create_async()
            .await;

        let verifier =
            TurnstileVerifier::new(format!("{}/siteverify", server.url()), "s3cret").unwrap();
        assert!(!verifier.verify("bad", None).await.unwrap());
    }

    #[tokio::test]
    async fn service_error_is_err_not_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/siteverify")
            .with_status(503)
            .create_async()
            .await;

        let verifier =
            TurnstileVerifier::new(format!("{}/siteverify", server.url()), "s3cret").unwrap();
        assert!(verifier.verify("tok", None).await.is_err());
    }
}
