//! Day templates and the weekly rotation.
//!
//! Slot quotas live here as data so template tuning never touches the
//! assembler.

use crate::models::exercise::{Intensity, MovementPattern};
use crate::models::plan::DayFocus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    Compound,
    Accessory,
    Core,
    Conditioning,
    Mobility,
}

#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    pub role: SlotRole,
    /// Patterns admissible for this slot, in preference order.
    pub patterns: &'static [MovementPattern],
    pub count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DayTemplate {
    pub focus: DayFocus,
    pub name: &'static str,
    pub slots: &'static [SlotSpec],
    pub default_sets: u32,
    pub default_reps: &'static str,
    pub default_rest_seconds: i32,
    pub default_intensity: Intensity,
}

use MovementPattern::*;

static UPPER_PUSH: DayTemplate = DayTemplate {
    focus: DayFocus::UpperPush,
    name: "Upper Push",
    slots: &[
        SlotSpec { role: SlotRole::Compound, patterns: &[Push], count: 2 },
        SlotSpec { role: SlotRole::Accessory, patterns: &[Push, Carry], count: 2 },
        SlotSpec { role: SlotRole::Core, patterns: &[Core], count: 1 },
    ],
    default_sets: 3,
    default_reps: "8-12",
    default_rest_seconds: 90,
    default_intensity: Intensity::Moderate,
};

static UPPER_PULL: DayTemplate = DayTemplate {
    focus: DayFocus::UpperPull,
    name: "Upper Pull",
    slots: &[
        SlotSpec { role: SlotRole::Compound, patterns: &[Pull], count: 2 },
        SlotSpec { role: SlotRole::Accessory, patterns: &[Pull, Carry], count: 2 },
        SlotSpec { role: SlotRole::Core, patterns: &[Core], count: 1 },
    ],
    default_sets: 3,
    default_reps: "8-12",
    default_rest_seconds: 90,
    default_intensity: Intensity::Moderate,
};

static LOWER: DayTemplate = DayTemplate {
    focus: DayFocus::Lower,
    name: "Lower Body",
    slots: &[
        SlotSpec { role: SlotRole::Compound, patterns: &[Squat, Hinge], count: 2 },
        SlotSpec { role: SlotRole::Accessory, patterns: &[Lunge, Hinge, Squat], count: 2 },
        SlotSpec { role: SlotRole::Core, patterns: &[Core], count: 1 },
    ],
    default_sets: 3,
    default_reps: "8-12",
    default_rest_seconds: 120,
    default_intensity: Intensity::Moderate,
};

static CORE: DayTemplate = DayTemplate {
    focus: DayFocus::Core,
    name: "Core & Conditioning",
    slots: &[
        SlotSpec { role: SlotRole::Core, patterns: &[Core], count: 3 },
        SlotSpec { role: SlotRole::Conditioning, patterns: &[Cardio, Carry], count: 1 },
        SlotSpec { role: SlotRole::Mobility, patterns: &[Mobility, Stretch], count: 1 },
    ],
    default_sets: 3,
    default_reps: "10-15",
    default_rest_seconds: 60,
    default_intensity: Intensity::Moderate,
};

static FULL_BODY: DayTemplate = DayTemplate {
    focus: DayFocus::FullBody,
    name: "Full Body",
    slots: &[
        SlotSpec { role: SlotRole::Compound, patterns: &[Squat, Hinge], count: 1 },
        SlotSpec { role: SlotRole::Compound, patterns: &[Push, Pull], count: 2 },
        SlotSpec { role: SlotRole::Accessory, patterns: &[Lunge, Carry], count: 1 },
        SlotSpec { role: SlotRole::Core, patterns: &[Core], count: 1 },
    ],
    default_sets: 3,
    default_reps: "8-12",
    default_rest_seconds: 90,
    default_intensity: Intensity::Moderate,
};

static ACTIVE_RECOVERY: DayTemplate = DayTemplate {
    focus: DayFocus::ActiveRecovery,
    name: "Active Recovery",
    slots: &[
        SlotSpec { role: SlotRole::Conditioning, patterns: &[Cardio], count: 1 },
        SlotSpec { role: SlotRole::Mobility, patterns: &[Mobility], count: 2 },
        SlotSpec { role: SlotRole::Mobility, patterns: &[Stretch], count: 2 },
    ],
    default_sets: 2,
    default_reps: "30-60s",
    default_rest_seconds: 30,
    default_intensity: Intensity::Light,
};

/// Weekly rotation, day 0 = plan start date.
pub fn weekly_rotation() -> [DayFocus; 7] {
    [
        DayFocus::UpperPush,
        DayFocus::Lower,
        DayFocus::UpperPull,
        DayFocus::Rest,
        DayFocus::FullBody,
        DayFocus::Core,
        DayFocus::ActiveRecovery,
    ]
}

pub fn template_for(focus: DayFocus) -> Option<&'static DayTemplate> {
    match focus {
        DayFocus::UpperPush => Some(&UPPER_PUSH),
        DayFocus::UpperPull => Some(&UPPER_PULL),
        DayFocus::Lower => Some(&LOWER),
        DayFocus::Core => Some(&CORE),
        DayFocus::FullBody => Some(&FULL_BODY),
        DayFocus::ActiveRecovery => Some(&ACTIVE_RECOVERY),
        DayFocus::Rest => None,
    }
}

/// Substitution order when a slot's own patterns yield no candidates.
pub fn fallback_patterns(pattern: MovementPattern) -> &'static [MovementPattern] {
    match pattern {
        Push => &[Carry, Core],
        Pull => &[Carry, Core],
        Squat => &[Lunge, Hinge],
        Hinge => &[Squat, Lunge],
        Lunge => &[Squat, Hinge],
        Carry => &[Core],
        Core => &[Mobility],
        Cardio => &[Mobility, Stretch],
        Mobility => &[Stretch],
        Stretch => &[Mobility],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_training_focus_has_a_template() {
        for focus in weekly_rotation() {
            if !focus.is_rest() {
                assert!(template_for(focus).is_some(), "{:?} missing template", focus);
            }
        }
    }

    #[test]
    fn rotation_includes_rest() {
        assert!(weekly_rotation().iter().any(|f| f.is_rest()));
    }
}
