//! Application setup and initialization

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use formdesk_core::Config;
use formdesk_infra::rate_limit::InMemoryRateLimitStore;
use formdesk_services::{
    BotVerifier, GeocodingApi, GeocodingClient, HelpdeskApi, HelpdeskClient, TurnstileVerifier,
};
use std::sync::Arc;
use std::time::Duration;

const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

use crate::services::intake::templates::TemplateRegistry;
use crate::state::AppState;

/// Initialize the entire application: telemetry, outbound clients and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    formdesk_infra::init_telemetry(&config.server.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = build_state(config.clone()).context("Failed to build application state")?;

    formdesk_infra::spawn_sweeper(state.rate_limiter.clone(), RATE_LIMIT_SWEEP_INTERVAL);
    tracing::info!(
        ticket_limit = config.rate_limit.ticket_limit_per_window,
        geocode_limit = config.rate_limit.geocode_limit_per_window,
        window_secs = config.rate_limit.window_secs,
        "Rate limiting enabled with periodic cleanup (every 5 minutes)"
    );
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}

/// Wire outbound clients from configuration. Missing credentials leave the
/// client unset and are reported, not fatal.
pub fn build_state(config: Config) -> Result<Arc<AppState>> {
    let helpdesk: Option<Arc<dyn HelpdeskApi>> = match HelpdeskClient::from_config(&config.helpdesk)
    {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "Helpdesk client disabled; ticket creation will fail");
            None
        }
    };
    if config.helpdesk.support_email.is_none() {
        tracing::warn!("HELPDESK_SUPPORT_EMAIL is not set; ticket creation will fail");
    }

    let bot_verifier: Option<Arc<dyn BotVerifier>> = match &config.bot_verification.secret {
        Some(secret) => Some(Arc::new(TurnstileVerifier::new(
            config.bot_verification.verify_url.clone(),
            secret.clone(),
        )?)),
        None => {
            tracing::info!("Bot verification disabled");
            None
        }
    };

    let geocoder: Option<Arc<dyn GeocodingApi>> = match &config.geocoding.api_key {
        Some(key) => Some(Arc::new(GeocodingClient::new(
            config.geocoding.base_url.clone(),
            key.clone(),
        )?)),
        None => {
            tracing::warn!("GEOCODE_API_KEY is not set; geocode lookups will fail");
            None
        }
    };

    let rate_limiter = Arc::new(InMemoryRateLimitStore::new(Duration::from_secs(
        config.rate_limit.window_secs,
    )));

    Ok(Arc::new(AppState {
        config,
        rate_limiter,
        helpdesk,
        bot_verifier,
        geocoder,
        templates: TemplateRegistry::default(),
    }))
}
