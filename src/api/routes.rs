use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{PlanGenerationService, PlanService, ProfileService};
use crate::storage::FeedbackStore;

use super::health::health_check;
use super::{plans, profiles};

#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub plan_generation_service: PlanGenerationService,
    pub plan_service: PlanService,
    pub feedback_store: Arc<dyn FeedbackStore>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/users/:user_id/profile",
            get(profiles::get_profile).put(profiles::upsert_profile),
        )
        .route("/api/users/:user_id/plans", post(plans::generate_plan))
        .route(
            "/api/users/:user_id/plans/current",
            get(plans::get_current_plan),
        )
        .route(
            "/api/users/:user_id/plans/:plan_id/days/:day_number/regenerate",
            post(plans::regenerate_day),
        )
        .route(
            "/api/users/:user_id/workouts/saved",
            get(plans::get_saved_workouts).post(plans::save_workout),
        )
        .route(
            "/api/users/:user_id/feedback",
            post(plans::submit_feedback),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
