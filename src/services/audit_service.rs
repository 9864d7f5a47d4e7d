//! Best-effort audit sink. A write failure never fails plan generation;
//! it is logged and dropped.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::models::{AuditRecord, SafetyContext};
use crate::storage::AuditSink;
use crate::ENGINE_VERSION;

#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
    enabled: bool,
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    /// Append one record per rule application for a generated day.
    /// Context snapshot is ids only.
    pub async fn record_day(
        &self,
        plan_id: Uuid,
        workout_day: u8,
        safety: &SafetyContext,
        exercise_pool_ids: &[i32],
        recorded_at: DateTime<Utc>,
    ) {
        if !self.enabled {
            return;
        }
        for application in &safety.rules_applied {
            let record = AuditRecord {
                id: Uuid::new_v4(),
                user_id: application.user_id,
                plan_id,
                workout_day,
                rule_id: application.rule_id.clone(),
                category: application.category,
                action: application.action.clone(),
                message: application.message.clone(),
                exercise_pool_ids: exercise_pool_ids.to_vec(),
                engine_version: ENGINE_VERSION.to_string(),
                recorded_at,
            };
            if let Err(error) = self.sink.append(&record).await {
                warn!(rule_id = %record.rule_id, %error, "audit write dropped");
            }
        }
    }
}
