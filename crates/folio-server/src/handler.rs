use axum::response::Json;
use serde_json::{json, Value};

pub async fn ping_handler() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "folio-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
