use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::models::Profile;

use super::routes::AppState;
use super::{engine_error_response, ApiError};

/// Get a stored profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, (StatusCode, Json<ApiError>)> {
    let profile = state
        .profile_service
        .get_profile(user_id)
        .await
        .map_err(engine_error_response)?;

    profile.map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("PROFILE_NOT_FOUND", "Profile not found")),
        )
    })
}

/// Create or update a profile. Invariant violations are refused with
/// `PROFILE_INVALID`.
pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(mut profile): Json<Profile>,
) -> Result<Json<Profile>, (StatusCode, Json<ApiError>)> {
    profile.user_id = user_id;
    let saved = state
        .profile_service
        .upsert_profile(profile, Utc::now().date_naive())
        .await
        .map_err(engine_error_response)?;
    Ok(Json(saved))
}
