use axum::response::Json;
use serde_json::{json, Value};

use crate::ENGINE_VERSION;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": ENGINE_VERSION,
    }))
}
