// Persistence seams. The engine only sees these traits; deployment flags
// pick the backing implementation (in-process memory or Postgres).

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AuditRecord, ExerciseFeedback, Plan, Profile, SafetyConfigRow, SavedWorkout,
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch all active config rows.
    async fn fetch_rows(&self) -> Result<Vec<SafetyConfigRow>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn save_profile(&self, profile: &Profile) -> Result<()>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// The user's most recent plan.
    async fn get_plan(&self, user_id: Uuid) -> Result<Option<Plan>>;
    async fn get_plan_by_id(&self, plan_id: Uuid, user_id: Uuid) -> Result<Option<Plan>>;
    async fn save_plan(&self, plan: &Plan) -> Result<()>;
    async fn get_saved_workouts(&self, user_id: Uuid) -> Result<Vec<SavedWorkout>>;
    async fn save_saved_workout(&self, workout: &SavedWorkout) -> Result<()>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn list_feedback(&self, user_id: Uuid) -> Result<Vec<ExerciseFeedback>>;
    async fn save_feedback(&self, feedback: &ExerciseFeedback) -> Result<()>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one rule-application record. Write-once; callers never read
    /// back through this trait.
    async fn append(&self, record: &AuditRecord) -> Result<()>;
}
