//! In-process store. The local-first backend, and the deterministic
//! substitute tests run against.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    AuditRecord, ExerciseFeedback, Plan, Profile, SafetyConfigRow, SavedWorkout,
};

use super::{AuditSink, ConfigStore, FeedbackStore, PlanStore, ProfileStore};

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    plans: Mutex<HashMap<Uuid, Plan>>,
    saved_workouts: Mutex<Vec<SavedWorkout>>,
    feedback: Mutex<Vec<ExerciseFeedback>>,
    audit: Mutex<Vec<AuditRecord>>,
    config_rows: Mutex<Vec<SafetyConfigRow>>,
    // Test knobs: fail the next N operations of a kind.
    config_failures: AtomicU32,
    plan_save_failures: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_rows(rows: Vec<SafetyConfigRow>) -> Self {
        let store = Self::default();
        *store.config_rows.lock().unwrap() = rows;
        store
    }

    pub fn set_config_rows(&self, rows: Vec<SafetyConfigRow>) {
        *self.config_rows.lock().unwrap() = rows;
    }

    /// Make the next `n` config fetches fail.
    pub fn fail_config_fetches(&self, n: u32) {
        self.config_failures.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` plan saves fail.
    pub fn fail_plan_saves(&self, n: u32) {
        self.plan_save_failures.store(n, Ordering::SeqCst);
    }

    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit.lock().unwrap().clone()
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn fetch_rows(&self) -> Result<Vec<SafetyConfigRow>> {
        if Self::take_failure(&self.config_failures) {
            return Err(anyhow!("config store unavailable"));
        }
        Ok(self
            .config_rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn get_plan(&self, user_id: Uuid) -> Result<Option<Plan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn get_plan_by_id(&self, plan_id: Uuid, user_id: Uuid) -> Result<Option<Plan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .get(&plan_id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn save_plan(&self, plan: &Plan) -> Result<()> {
        if Self::take_failure(&self.plan_save_failures) {
            return Err(anyhow!("plan store unavailable"));
        }
        self.plans.lock().unwrap().insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_saved_workouts(&self, user_id: Uuid) -> Result<Vec<SavedWorkout>> {
        Ok(self
            .saved_workouts
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_saved_workout(&self, workout: &SavedWorkout) -> Result<()> {
        self.saved_workouts.lock().unwrap().push(workout.clone());
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn list_feedback(&self, user_id: Uuid) -> Result<Vec<ExerciseFeedback>> {
        Ok(self
            .feedback
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_feedback(&self, feedback: &ExerciseFeedback) -> Result<()> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        self.audit.lock().unwrap().push(record.clone());
        Ok(())
    }
}
