use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::exercise::Intensity;
use super::safety::{Checkpoint, SafetyContext};

/// Day focus in the weekly rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayFocus {
    UpperPush,
    UpperPull,
    Lower,
    Core,
    FullBody,
    ActiveRecovery,
    Rest,
}

impl DayFocus {
    pub fn is_rest(&self) -> bool {
        matches!(self, DayFocus::Rest)
    }
}

/// A single prescribed exercise inside a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrescription {
    pub exercise_id: i32,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub rest_seconds: i32,
    pub intensity: Intensity,
    /// Estimated minutes for this block, including rest.
    pub minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Session timeline: exercises interleaved with safety checkpoints, each
/// stamped with its minute offset from session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "entry")]
pub enum TimelineEntry {
    Exercise { minute: u32, exercise_id: i32, name: String },
    Checkpoint { minute: u32, checkpoint: Checkpoint },
}

impl TimelineEntry {
    pub fn minute(&self) -> u32 {
        match self {
            TimelineEntry::Exercise { minute, .. } => *minute,
            TimelineEntry::Checkpoint { minute, .. } => *minute,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub name: String,
    pub focus: DayFocus,
    pub exercises: Vec<ExercisePrescription>,
    pub total_minutes: u32,
    pub timeline: Vec<TimelineEntry>,
    /// Snapshot of the safety evaluation that shaped this workout, audit
    /// records included.
    pub safety_context: SafetyContext,
    pub explanations: Vec<String>,
}

/// One day of a plan. `variants` maps a session duration in minutes to the
/// workout sized for it; `None` marks a rest day for that duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDay {
    pub date: NaiveDate,
    pub day_number: u8,
    pub focus: DayFocus,
    pub variants: BTreeMap<u32, Option<Workout>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub days: Vec<PlanDay>,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn day(&self, day_number: u8) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }
}

/// A workout the user kept. Independent of plan lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedWorkout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub workout: Workout,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackFlag {
    TooHard,
    DysphoriaTriggering,
    Painful,
    Loved,
}

impl FeedbackFlag {
    /// Scoring weight folded into future selection.
    pub fn score_weight(&self) -> f64 {
        match self {
            FeedbackFlag::Painful | FeedbackFlag::DysphoriaTriggering => 0.5,
            FeedbackFlag::TooHard => 0.8,
            FeedbackFlag::Loved => 1.1,
        }
    }
}

/// User feedback on an exercise; folded into future selection weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseFeedback {
    pub user_id: Uuid,
    pub exercise_id: i32,
    pub flag: FeedbackFlag,
    pub created_at: DateTime<Utc>,
}
