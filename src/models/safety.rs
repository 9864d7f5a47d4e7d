use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::exercise::{Exercise, Intensity, MovementPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Binding,
    PostOp,
    Hrt,
    Dysphoria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

/// Categorical prohibition emitted by a critical rule. Any matching exercise
/// is inadmissible regardless of score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriticalBlock {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<MovementPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub muscle_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exercise_ids: Vec<i32>,
}

impl CriticalBlock {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.muscle_groups.is_empty() && self.exercise_ids.is_empty()
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        if self.patterns.contains(&exercise.pattern) {
            return true;
        }
        if self.exercise_ids.contains(&exercise.id) {
            return true;
        }
        self.muscle_groups.iter().any(|m| exercise.targets(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    BinderBreak,
    SafetyWarning,
    SafetyReminder,
    ScarCare,
    PostWorkoutReminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "minutes")]
pub enum CheckpointTrigger {
    WorkoutStart,
    BeforeStrength,
    BeforeCardio,
    EveryMinutes(u32),
    CoolDown,
    WorkoutCompletion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub kind: CheckpointKind,
    pub trigger: CheckpointTrigger,
    pub message: String,
    pub severity: Severity,
}

/// Scoring-time preference adjustment. Soft filters never exclude; they
/// reweight candidates during selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefer_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprioritize_tags: Vec<String>,
    #[serde(default)]
    pub prefer_alternatives: bool,
}

/// The merged parameter-modification bag. Every field folds in with a
/// key-specific most-restrictive-wins rule; see `engine::merge`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_increase: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_reduction: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progressive_overload_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workout_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_body_volume_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_body_volume_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_range: Option<String>,
    /// Keys the engine does not model explicitly. Numeric, merged with max.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl ParameterSet {
    pub fn is_empty(&self) -> bool {
        self == &ParameterSet::default()
    }
}

/// One audit record per rule firing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleApplication {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Action type taken: critical_block, exclude_exercises,
    /// modify_parameters, inject_checkpoint or soft_filter.
    pub action: String,
    pub message: String,
    pub user_id: Uuid,
    pub applied_at: DateTime<Utc>,
}

/// Append-only audit entry, one per rule firing per generated workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    /// Day number within the plan the workout belongs to.
    pub workout_day: u8,
    pub rule_id: String,
    pub category: RuleCategory,
    pub action: String,
    pub message: String,
    /// Context snapshot: exercise ids in the evaluated pool, not full
    /// objects.
    pub exercise_pool_ids: Vec<i32>,
    pub engine_version: String,
    pub recorded_at: DateTime<Utc>,
}

/// Aggregated output of rules evaluation, consumed by the plan assembler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyContext {
    pub critical_blocks: Vec<CriticalBlock>,
    pub excluded_exercise_ids: BTreeSet<i32>,
    pub modified_parameters: ParameterSet,
    pub required_checkpoints: Vec<Checkpoint>,
    pub soft_filters: Vec<SoftFilter>,
    pub rules_applied: Vec<RuleApplication>,
}

impl SafetyContext {
    /// Whether an exercise survives the hard constraints (critical blocks
    /// and the exclusion set). Soft filters are applied later, in scoring.
    pub fn admits(&self, exercise: &Exercise) -> bool {
        if self.excluded_exercise_ids.contains(&exercise.id) {
            return false;
        }
        !self.critical_blocks.iter().any(|b| b.matches(exercise))
    }

    pub fn blocks_pattern(&self, pattern: MovementPattern) -> bool {
        self.critical_blocks.iter().any(|b| b.patterns.contains(&pattern))
    }

    /// One-line user-facing explanations for every rule that affected the
    /// workout, plus an exclusion summary.
    pub fn explanations(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rules_applied
            .iter()
            .map(|r| r.message.clone())
            .filter(|m| !m.is_empty())
            .collect();
        lines.dedup();
        if !self.excluded_exercise_ids.is_empty() {
            lines.push(format!(
                "{} exercises excluded for your current safety profile",
                self.excluded_exercise_ids.len()
            ));
        }
        lines
    }
}
