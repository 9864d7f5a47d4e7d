use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::models::{ExerciseFeedback, FeedbackFlag, Plan, SavedWorkout, Workout};
use crate::services::PlanWarning;

use super::routes::AppState;
use super::{engine_error_response, ApiError};

#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct WarningBody {
    pub code: String,
    pub message: String,
}

impl From<PlanWarning> for WarningBody {
    fn from(warning: PlanWarning) -> Self {
        Self {
            code: warning.code.to_string(),
            message: warning.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Plan,
    pub warnings: Vec<WarningBody>,
    pub success: bool,
}

/// Generate a new weekly plan for the user.
pub async fn generate_plan(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ApiError>)> {
    let start_date = request.start_date.unwrap_or_else(|| Utc::now().date_naive());

    let outcome = state
        .plan_generation_service
        .generate_plan(user_id, start_date, Utc::now())
        .await
        .map_err(|e| {
            error!("plan generation failed: {}", e);
            engine_error_response(e)
        })?;

    Ok(Json(PlanResponse {
        plan: outcome.plan,
        warnings: outcome.warnings.into_iter().map(Into::into).collect(),
        success: true,
    }))
}

/// The user's most recent plan.
pub async fn get_current_plan(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Plan>, (StatusCode, Json<ApiError>)> {
    let plan = state
        .plan_service
        .current_plan(user_id)
        .await
        .map_err(engine_error_response)?;

    plan.map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("PLAN_NOT_FOUND", "No plan for this user")),
        )
    })
}

#[derive(Debug, Deserialize)]
pub struct RegenerateDayPath {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub day_number: u8,
}

/// Rebuild a single day, returning the new plan.
pub async fn regenerate_day(
    State(state): State<AppState>,
    Path(path): Path<RegenerateDayPath>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ApiError>)> {
    let outcome = state
        .plan_generation_service
        .regenerate_day(path.plan_id, path.user_id, path.day_number)
        .await
        .map_err(engine_error_response)?;

    let outcome = outcome.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("PLAN_NOT_FOUND", "Plan or day not found")),
        )
    })?;

    Ok(Json(PlanResponse {
        plan: outcome.plan,
        warnings: outcome.warnings.into_iter().map(Into::into).collect(),
        success: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveWorkoutRequest {
    pub name: String,
    pub workout: Workout,
}

/// Keep a copy of a workout, independent of plan lifetime.
pub async fn save_workout(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SaveWorkoutRequest>,
) -> Result<Json<SavedWorkout>, (StatusCode, Json<ApiError>)> {
    let saved = SavedWorkout {
        id: Uuid::new_v4(),
        user_id,
        name: request.name,
        workout: request.workout,
        saved_at: Utc::now(),
    };
    state
        .plan_service
        .save_workout(&saved)
        .await
        .map_err(engine_error_response)?;
    Ok(Json(saved))
}

pub async fn get_saved_workouts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SavedWorkout>>, (StatusCode, Json<ApiError>)> {
    let workouts = state
        .plan_service
        .saved_workouts(user_id)
        .await
        .map_err(engine_error_response)?;
    Ok(Json(workouts))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub exercise_id: i32,
    pub flag: FeedbackFlag,
}

/// Record exercise feedback; flags influence future selection weights.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let feedback = ExerciseFeedback {
        user_id,
        exercise_id: request.exercise_id,
        flag: request.flag,
        created_at: Utc::now(),
    };
    state.feedback_store.save_feedback(&feedback).await.map_err(|e| {
        error!("feedback save failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("PERSISTENCE_FAILED", "Could not save feedback")),
        )
    })?;
    Ok(StatusCode::NO_CONTENT)
}
