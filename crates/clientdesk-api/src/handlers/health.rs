//! Liveness endpoint.

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

/// GET /api/health — liveness only, no auth.
pub async fn health_check() -> Json<JsonValue> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    }))
}
