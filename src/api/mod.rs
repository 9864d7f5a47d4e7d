// API routes and handlers

pub mod health;
pub mod plans;
pub mod profiles;
pub mod routes;

use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::error::EngineError;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }
}

/// Map an engine error onto the boundary contract. Only hard errors reach
/// this point; soft degradations travel as warnings on a successful
/// response.
pub fn engine_error_response(error: EngineError) -> (StatusCode, Json<ApiError>) {
    let status = match &error {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError::new(error.error_code(), &error.to_string())),
    )
}
