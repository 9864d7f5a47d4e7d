//! Plan persistence with a bounded retry budget.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Plan, SavedWorkout};
use crate::storage::PlanStore;

const SAVE_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 100;

#[derive(Clone)]
pub struct PlanService {
    store: Arc<dyn PlanStore>,
}

impl PlanService {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }

    pub async fn current_plan(&self, user_id: Uuid) -> Result<Option<Plan>, EngineError> {
        self.store
            .get_plan(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    pub async fn plan_by_id(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Plan>, EngineError> {
        self.store
            .get_plan_by_id(plan_id, user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    /// Save with three attempts and exponential backoff. After the final
    /// failure the caller keeps the in-memory plan and reports
    /// `PERSISTENCE_FAILED`.
    pub async fn save_with_retry(&self, plan: &Plan) -> Result<(), EngineError> {
        let mut last_error = None;
        for attempt in 0..SAVE_ATTEMPTS {
            match self.store.save_plan(plan).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    warn!(plan_id = %plan.id, attempt, %error, "plan save failed");
                    last_error = Some(error);
                    if attempt + 1 < SAVE_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(
                            BACKOFF_BASE_MS << attempt,
                        ))
                        .await;
                    }
                }
            }
        }
        Err(EngineError::Persistence(
            last_error.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    pub async fn saved_workouts(&self, user_id: Uuid) -> Result<Vec<SavedWorkout>, EngineError> {
        self.store
            .get_saved_workouts(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    pub async fn save_workout(&self, workout: &SavedWorkout) -> Result<(), EngineError> {
        self.store
            .save_saved_workout(workout)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }
}
