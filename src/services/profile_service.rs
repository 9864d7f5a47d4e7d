//! Profile persistence with invariant validation on every write.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::Profile;
use crate::storage::ProfileStore;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, EngineError> {
        self.store
            .get_profile(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    /// Validate and persist. An invalid profile is refused outright.
    pub async fn upsert_profile(
        &self,
        mut profile: Profile,
        today: NaiveDate,
    ) -> Result<Profile, EngineError> {
        profile.validate(today)?;
        profile.updated_at = Utc::now();
        self.store
            .save_profile(&profile)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))?;
        Ok(profile)
    }
}
