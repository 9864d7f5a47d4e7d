use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderIdentity {
    TransMasc,
    TransFemme,
    NonBinary,
    Questioning,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    Feminization,
    Masculinization,
    GeneralFitness,
    Strength,
    Aesthetics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrtType {
    None,
    Estrogen,
    Testosterone,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrtFrequency {
    Daily,
    EveryOtherDay,
    Weekly,
    Biweekly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrtStatus {
    #[serde(rename = "type")]
    pub hrt_type: HrtType,
    /// Whole months on HRT. Must be zero when `hrt_type` is `None`.
    pub months: u32,
    pub frequency: Option<HrtFrequency>,
    /// Explicit administration days. Authoritative for injection-day
    /// detection; when absent, injection-day softening never applies.
    pub days: Option<Vec<Weekday>>,
}

impl HrtStatus {
    pub fn none() -> Self {
        Self {
            hrt_type: HrtType::None,
            months: 0,
            frequency: None,
            days: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hrt_type != HrtType::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinderKind {
    Commercial,
    Sports,
    AceBandage,
    Diy,
    None,
}

impl BinderKind {
    /// Ace bandages and DIY compression carry materially higher risk than
    /// purpose-made binders.
    pub fn is_high_risk(&self) -> bool {
        matches!(self, BinderKind::AceBandage | BinderKind::Diy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingFrequency {
    Daily,
    Sometimes,
    Rarely,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingStatus {
    pub binds: bool,
    pub binder_type: Option<BinderKind>,
    pub frequency: Option<BindingFrequency>,
    pub duration_hours: Option<u32>,
}

impl BindingStatus {
    pub fn not_binding() -> Self {
        Self {
            binds: false,
            binder_type: None,
            frequency: None,
            duration_hours: None,
        }
    }

    pub fn kind(&self) -> BinderKind {
        if !self.binds {
            return BinderKind::None;
        }
        self.binder_type.unwrap_or(BinderKind::Commercial)
    }

    pub fn hours(&self) -> u32 {
        self.duration_hours.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgeryType {
    TopSurgery,
    BottomSurgery,
    Vaginoplasty,
    Phalloplasty,
    Metoidioplasty,
    Orchiectomy,
    Hysterectomy,
    BreastAugmentation,
    Ffs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeryRecord {
    #[serde(rename = "type")]
    pub surgery_type: SurgeryType,
    pub date: NaiveDate,
    pub fully_healed: bool,
}

impl SurgeryRecord {
    /// Weeks elapsed since surgery, clamped to zero for future dates. A
    /// scheduled surgery is treated as zero weeks post-op (most restrictive
    /// phase).
    pub fn weeks_post_op(&self, today: NaiveDate) -> u32 {
        let days = (today - self.date).num_days();
        if days <= 0 {
            0
        } else {
            (days / 7) as u32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DysphoriaTrigger {
    LookingAtChest,
    Mirrors,
    BodyContact,
    CrowdedSpaces,
    TightClothing,
    Photos,
    Swimming,
    FormFocused,
}

/// Session durations the planner may emit, in minutes.
pub const SUPPORTED_DURATIONS: [u32; 4] = [30, 45, 60, 90];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub identity: GenderIdentity,
    pub primary_goal: PrimaryGoal,
    pub experience: ExperienceLevel,
    pub equipment: BTreeSet<String>,
    pub session_durations: BTreeSet<u32>,
    pub hrt: HrtStatus,
    pub binding: BindingStatus,
    pub surgeries: Vec<SurgeryRecord>,
    pub dysphoria_triggers: BTreeSet<DysphoriaTrigger>,
    /// Allows surgery records with future dates (pre-op planning). Future
    /// dates are still evaluated as zero weeks post-op.
    #[serde(default)]
    pub planning_ahead: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Check the profile invariants. Violations are hard errors: no plan is
    /// generated from an invalid profile.
    pub fn validate(&self, today: NaiveDate) -> Result<(), EngineError> {
        if self.hrt.hrt_type == HrtType::None && self.hrt.months != 0 {
            return Err(EngineError::Validation(
                "months on HRT must be zero when HRT type is none".to_string(),
            ));
        }
        if self.session_durations.is_empty() {
            return Err(EngineError::Validation(
                "at least one session duration is required".to_string(),
            ));
        }
        for duration in &self.session_durations {
            if !SUPPORTED_DURATIONS.contains(duration) {
                return Err(EngineError::Validation(format!(
                    "unsupported session duration: {} minutes",
                    duration
                )));
            }
        }
        if self.binding.binds && self.binding.kind() == BinderKind::None {
            return Err(EngineError::Validation(
                "binder type is required when binding".to_string(),
            ));
        }
        for surgery in &self.surgeries {
            if surgery.date > today && (surgery.fully_healed || !self.planning_ahead) {
                return Err(EngineError::Validation(format!(
                    "surgery date {} is in the future",
                    surgery.date
                )));
            }
        }
        Ok(())
    }

    /// Unhealed surgeries, most recent first.
    pub fn unhealed_surgeries(&self) -> Vec<&SurgeryRecord> {
        let mut unhealed: Vec<&SurgeryRecord> =
            self.surgeries.iter().filter(|s| !s.fully_healed).collect();
        unhealed.sort_by(|a, b| b.date.cmp(&a.date));
        unhealed
    }

    /// The surgery record driving restrictions for a given type: the most
    /// recent unhealed one.
    pub fn active_surgery(&self, surgery_type: SurgeryType) -> Option<&SurgeryRecord> {
        self.unhealed_surgeries()
            .into_iter()
            .find(|s| s.surgery_type == surgery_type)
    }

    pub fn has_unhealed_surgery(&self) -> bool {
        self.surgeries.iter().any(|s| !s.fully_healed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_profile() -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            identity: GenderIdentity::NonBinary,
            primary_goal: PrimaryGoal::GeneralFitness,
            experience: ExperienceLevel::Beginner,
            equipment: BTreeSet::from(["none".to_string()]),
            session_durations: BTreeSet::from([30, 45]),
            hrt: HrtStatus::none(),
            binding: BindingStatus::not_binding(),
            surgeries: vec![],
            dysphoria_triggers: BTreeSet::new(),
            planning_ahead: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hrt_months_must_be_zero_without_hrt() {
        let mut profile = base_profile();
        profile.hrt.months = 6;
        let err = profile
            .validate(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .unwrap_err();
        assert_eq!(err.error_code(), "PROFILE_INVALID");
    }

    #[test]
    fn future_surgery_requires_planning_ahead() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut profile = base_profile();
        profile.surgeries.push(SurgeryRecord {
            surgery_type: SurgeryType::TopSurgery,
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            fully_healed: false,
        });
        assert!(profile.validate(today).is_err());

        profile.planning_ahead = true;
        assert!(profile.validate(today).is_ok());
        assert_eq!(profile.surgeries[0].weeks_post_op(today), 0);
    }

    #[test]
    fn surgery_today_is_zero_weeks_post_op() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let record = SurgeryRecord {
            surgery_type: SurgeryType::TopSurgery,
            date: today,
            fully_healed: false,
        };
        assert_eq!(record.weeks_post_op(today), 0);
    }

    #[test]
    fn most_recent_unhealed_surgery_wins() {
        let mut profile = base_profile();
        profile.surgeries = vec![
            SurgeryRecord {
                surgery_type: SurgeryType::TopSurgery,
                date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
                fully_healed: false,
            },
            SurgeryRecord {
                surgery_type: SurgeryType::TopSurgery,
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                fully_healed: false,
            },
        ];
        let active = profile.active_surgery(SurgeryType::TopSurgery).unwrap();
        assert_eq!(active.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
