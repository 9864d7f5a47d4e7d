use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::profile::{ExperienceLevel, PrimaryGoal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    Push,
    Pull,
    Squat,
    Hinge,
    Lunge,
    Carry,
    Core,
    Cardio,
    Mobility,
    Stretch,
}

impl MovementPattern {
    /// Strength patterns anchor the `before_strength` checkpoint trigger.
    pub fn is_strength(&self) -> bool {
        matches!(
            self,
            MovementPattern::Push
                | MovementPattern::Pull
                | MovementPattern::Squat
                | MovementPattern::Hinge
                | MovementPattern::Lunge
                | MovementPattern::Carry
        )
    }
}

/// Effort level, ordered from least to most demanding. Lower is more
/// restrictive when merging safety parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    VeryLight,
    Light,
    Moderate,
    High,
    VeryHigh,
}

/// Post-operative recovery phases, ordered from most to least restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPhase {
    Immediate,
    Early,
    Mid,
    Late,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i32,
    pub name: String,
    pub pattern: MovementPattern,
    pub target_muscles: BTreeSet<String>,
    /// Equipment needed; `none` means bodyweight only.
    pub equipment: BTreeSet<String>,
    pub difficulty: ExperienceLevel,
    pub intensity: Intensity,
    pub plyometric: bool,
    pub binder_aware: bool,
    pub heavy_binding_safe: bool,
    pub pelvic_floor_safe: bool,
    pub contraindications: BTreeSet<String>,
    pub dysphoria_tags: BTreeSet<String>,
    /// Minimum recovery phase at which this exercise becomes admissible
    /// post-op. Absent means the exercise has not been cleared for post-op
    /// users at all.
    pub earliest_safe_phase: Option<RecoveryPhase>,
    pub effectiveness_rating: f64,
    pub gender_goal_emphasis: BTreeSet<PrimaryGoal>,
}

impl Exercise {
    pub fn requires_equipment(&self) -> bool {
        !self.equipment.contains("none")
    }

    /// Whether the user's equipment set covers this exercise.
    pub fn available_with(&self, equipment: &BTreeSet<String>) -> bool {
        if !self.requires_equipment() {
            return true;
        }
        self.equipment.iter().all(|e| equipment.contains(e))
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.dysphoria_tags.contains(t))
    }

    pub fn has_contraindication(&self, name: &str) -> bool {
        self.contraindications.contains(name)
    }

    pub fn targets(&self, muscle: &str) -> bool {
        self.target_muscles.contains(muscle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_order_is_restrictiveness_order() {
        assert!(Intensity::VeryLight < Intensity::Light);
        assert!(Intensity::Light < Intensity::Moderate);
        assert!(Intensity::Moderate < Intensity::High);
        assert!(Intensity::High < Intensity::VeryHigh);
    }

    #[test]
    fn recovery_phases_are_ordered() {
        assert!(RecoveryPhase::Immediate < RecoveryPhase::Early);
        assert!(RecoveryPhase::Late < RecoveryPhase::Maintenance);
    }

    #[test]
    fn bodyweight_exercises_never_need_equipment() {
        let exercise = Exercise {
            id: 1,
            name: "Push-up".to_string(),
            pattern: MovementPattern::Push,
            target_muscles: BTreeSet::from(["chest".to_string()]),
            equipment: BTreeSet::from(["none".to_string()]),
            difficulty: ExperienceLevel::Beginner,
            intensity: Intensity::Moderate,
            plyometric: false,
            binder_aware: true,
            heavy_binding_safe: false,
            pelvic_floor_safe: true,
            contraindications: BTreeSet::new(),
            dysphoria_tags: BTreeSet::new(),
            earliest_safe_phase: Some(RecoveryPhase::Mid),
            effectiveness_rating: 0.8,
            gender_goal_emphasis: BTreeSet::new(),
        };
        assert!(exercise.available_with(&BTreeSet::new()));
    }
}
