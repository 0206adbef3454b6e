use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Does not touch any upstream service.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
