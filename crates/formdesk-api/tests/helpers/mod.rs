//! Shared setup for HTTP-level tests: a `TestServer` over the real router, with
//! mockito servers standing in for the helpdesk, bot verifier and geocoder.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use formdesk_core::Config;
use mockito::{Matcher, Mock, ServerGuard};

pub const ALLOWED_ORIGIN: &str = "https://shop.example.com";
pub const SUPPORT_EMAIL: &str = "support@shop.example.com";

pub struct TestApp {
    pub server: TestServer,
    pub helpdesk: ServerGuard,
    pub geocoder: ServerGuard,
    pub verifier: ServerGuard,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Build an app whose outbound URLs point at fresh mock servers. `customize`
/// runs last and may override anything, including removing credentials.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let helpdesk = mockito::Server::new_async().await;
    let geocoder = mockito::Server::new_async().await;
    let verifier = mockito::Server::new_async().await;

    let mut config = Config::default();
    config.server.allowed_origins = vec![ALLOWED_ORIGIN.to_string()];
    config.helpdesk.base_url = Some(helpdesk.url());
    config.helpdesk.username = Some("agent@shop.example.com".to_string());
    config.helpdesk.api_key = Some("test-api-key".to_string());
    config.helpdesk.support_email = Some(SUPPORT_EMAIL.to_string());
    config.helpdesk.timeout_secs = 5;
    config.geocoding.api_key = Some("geo-key".to_string());
    config.geocoding.base_url = geocoder.url();
    config.bot_verification.verify_url = format!("{}/siteverify", verifier.url());
    customize(&mut config);

    let state = formdesk_api::build_state(config.clone()).expect("state builds");
    let router = formdesk_api::setup_routes(&config, state);
    let server = TestServer::new(router).expect("test server starts");

    TestApp {
        server,
        helpdesk,
        geocoder,
        verifier,
    }
}

/// The minimal valid contact form.
pub fn contact_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("formType", "contact-form")
        .add_text("email", "test@test.com")
        .add_text("name", "Jane Doe")
        .add_text("message", "Hello\nWorld")
}

pub fn text_file(name: &str, contents: &str) -> Part {
    Part::bytes(bytes::Bytes::from(contents.to_string()))
        .file_name(name.to_string())
        .mime_type("text/plain")
}

/// Ticket endpoint answering with `ticket_id`, expected `times` times.
pub async fn mock_ticket_created(server: &mut ServerGuard, ticket_id: u64, times: usize) -> Mock {
    server
        .mock("POST", "/api/tickets")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"id": {ticket_id}}}"#))
        .expect(times)
        .create_async()
        .await
}

/// Upload endpoint that must never be reached.
pub async fn mock_upload_never_called(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/api/upload")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await
}
