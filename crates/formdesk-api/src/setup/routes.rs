//! Route configuration and setup

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use formdesk_core::Config;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{cors_middleware, request_id_middleware, CorsPolicy};
use crate::state::AppState;

pub const CREATE_TICKET_PATH: &str = "/api/create-ticket";
pub const GEOCODE_PATH: &str = "/api/geocode";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let origins = Arc::new(config.server.allowed_origins.clone());

    let tickets = Router::new()
        .route(
            CREATE_TICKET_PATH,
            post(handlers::tickets::create_ticket).fallback(handlers::method_not_allowed),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            CorsPolicy::new(origins.clone(), "POST, OPTIONS"),
            cors_middleware,
        ));

    let geocode = Router::new()
        .route(
            GEOCODE_PATH,
            get(handlers::geocode::geocode).fallback(handlers::method_not_allowed),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            CorsPolicy::new(origins, "GET, OPTIONS"),
            cors_middleware,
        ));

    let max_body_bytes = config.max_body_bytes();
    tracing::debug!(max_body_bytes, "Request body limit configured");

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(tickets)
        .merge(geocode)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
