//! Shared application state

use formdesk_core::Config;
use formdesk_infra::rate_limit::RateLimitStore;
use formdesk_services::{BotVerifier, GeocodingApi, HelpdeskApi};
use std::sync::Arc;

use crate::services::intake::templates::TemplateRegistry;

/// Built once at startup and shared by every request.
///
/// Outbound clients are `None` when their credentials are missing; the affected
/// endpoint answers 500 until the deployment is fixed.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub helpdesk: Option<Arc<dyn HelpdeskApi>>,
    pub bot_verifier: Option<Arc<dyn BotVerifier>>,
    pub geocoder: Option<Arc<dyn GeocodingApi>>,
    pub templates: TemplateRegistry,
}
