//! Postgres-backed store. Plan and profile bodies are stored as JSONB;
//! queries are runtime-checked so builds never need a live database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    AuditRecord, ExerciseFeedback, FeedbackFlag, Plan, Profile, SafetyConfigRow, SavedWorkout,
};

use super::{AuditSink, ConfigStore, FeedbackStore, PlanStore, ProfileStore};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PostgresStore {
    async fn fetch_rows(&self) -> Result<Vec<SafetyConfigRow>> {
        let rows = sqlx::query(
            r#"
            SELECT rule_category, rule_id, config, is_active
            FROM safety_config
            WHERE is_active = true
            ORDER BY rule_category, rule_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("fetching safety config rows")?;

        rows.into_iter()
            .map(|row| {
                Ok(SafetyConfigRow {
                    rule_category: row.try_get("rule_category")?,
                    rule_id: row.try_get("rule_id")?,
                    config: row.try_get("config")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT profile FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching profile")?;

        row.map(|r| {
            let body: serde_json::Value = r.try_get("profile")?;
            serde_json::from_value(body).context("decoding profile body")
        })
        .transpose()
    }

    async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, profile, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET profile = $2, updated_at = $3
            "#,
        )
        .bind(profile.user_id)
        .bind(serde_json::to_value(profile)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("saving profile")?;
        Ok(())
    }
}

#[async_trait]
impl PlanStore for PostgresStore {
    async fn get_plan(&self, user_id: Uuid) -> Result<Option<Plan>> {
        let row = sqlx::query(
            r#"
            SELECT body FROM plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching latest plan")?;

        row.map(|r| {
            let body: serde_json::Value = r.try_get("body")?;
            serde_json::from_value(body).context("decoding plan body")
        })
        .transpose()
    }

    async fn get_plan_by_id(&self, plan_id: Uuid, user_id: Uuid) -> Result<Option<Plan>> {
        let row = sqlx::query("SELECT body FROM plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching plan by id")?;

        row.map(|r| {
            let body: serde_json::Value = r.try_get("body")?;
            serde_json::from_value(body).context("decoding plan body")
        })
        .transpose()
    }

    async fn save_plan(&self, plan: &Plan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plans (id, user_id, start_date, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET body = $4
            "#,
        )
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.start_date)
        .bind(serde_json::to_value(plan)?)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .context("saving plan")?;
        Ok(())
    }

    async fn get_saved_workouts(&self, user_id: Uuid) -> Result<Vec<SavedWorkout>> {
        let rows = sqlx::query(
            "SELECT body FROM saved_workouts WHERE user_id = $1 ORDER BY saved_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("fetching saved workouts")?;

        rows.into_iter()
            .map(|r| {
                let body: serde_json::Value = r.try_get("body")?;
                serde_json::from_value(body).context("decoding saved workout")
            })
            .collect()
    }

    async fn save_saved_workout(&self, workout: &SavedWorkout) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_workouts (id, user_id, body, saved_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(workout.id)
        .bind(workout.user_id)
        .bind(serde_json::to_value(workout)?)
        .bind(workout.saved_at)
        .execute(&self.pool)
        .await
        .context("saving workout")?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for PostgresStore {
    async fn list_feedback(&self, user_id: Uuid) -> Result<Vec<ExerciseFeedback>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, exercise_id, flag, created_at
            FROM exercise_feedback
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("fetching feedback")?;

        rows.into_iter()
            .map(|r| {
                let flag: String = r.try_get("flag")?;
                let flag: FeedbackFlag =
                    serde_json::from_value(serde_json::Value::String(flag))
                        .context("decoding feedback flag")?;
                let created_at: DateTime<Utc> = r.try_get("created_at")?;
                Ok(ExerciseFeedback {
                    user_id: r.try_get("user_id")?,
                    exercise_id: r.try_get("exercise_id")?,
                    flag,
                    created_at,
                })
            })
            .collect()
    }

    async fn save_feedback(&self, feedback: &ExerciseFeedback) -> Result<()> {
        let flag = serde_json::to_value(feedback.flag)?;
        sqlx::query(
            r#"
            INSERT INTO exercise_feedback (user_id, exercise_id, flag, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(feedback.user_id)
        .bind(feedback.exercise_id)
        .bind(flag.as_str().unwrap_or("loved"))
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .context("saving feedback")?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for PostgresStore {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        let category = serde_json::to_value(record.category)?;
        sqlx::query(
            r#"
            INSERT INTO rule_audit (
                id, user_id, plan_id, workout_day, rule_id, category, action,
                message, exercise_pool_ids, engine_version, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.plan_id)
        .bind(record.workout_day as i16)
        .bind(&record.rule_id)
        .bind(category.as_str().unwrap_or("binding"))
        .bind(&record.action)
        .bind(&record.message)
        .bind(serde_json::to_value(&record.exercise_pool_ids)?)
        .bind(&record.engine_version)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .context("appending audit record")?;
        Ok(())
    }
}
