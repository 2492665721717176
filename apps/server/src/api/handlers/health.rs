//! Health check handler

use axum::Json;
use serde_json::{json, Value as JsonValue};

/// GET /health
pub async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}
