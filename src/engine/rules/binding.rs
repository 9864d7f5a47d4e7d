//! Chest-binding safety rules.

use super::{ActionSpec, Condition, SafetyRule, TriggerSpec};
use crate::models::safety::{CheckpointKind, RuleCategory, Severity};
use crate::models::safety_config::BindingConfigKey;

pub static RULES: &[SafetyRule] = &[
    SafetyRule {
        id: "binding_high_risk_exclusions",
        category: RuleCategory::Binding,
        severity: Severity::Critical,
        condition: Condition::RiskyBinder,
        action: ActionSpec::ExcludeUnsafeForBinding,
        message: "High-impact and chest-straining movements are removed while binding with an ace bandage or DIY binder",
    },
    SafetyRule {
        id: "binding_high_risk_parameters",
        category: RuleCategory::Binding,
        severity: Severity::High,
        condition: Condition::RiskyBinder,
        action: ActionSpec::ApplyBindingPack(BindingConfigKey::AceBandage),
        message: "Volume and intensity are reduced while binding with an unsafe binder",
    },
    SafetyRule {
        id: "binding_high_risk_warning",
        category: RuleCategory::Binding,
        severity: Severity::Critical,
        condition: Condition::RiskyBinder,
        action: ActionSpec::InjectCheckpoint {
            kind: CheckpointKind::SafetyWarning,
            trigger: TriggerSpec::WorkoutStart,
        },
        message: "Ace bandages and DIY binders restrict breathing and can damage ribs. Stop immediately if you feel short of breath or any chest pain",
    },
    SafetyRule {
        id: "binding_standard_parameters",
        category: RuleCategory::Binding,
        severity: Severity::Moderate,
        condition: Condition::StandardBinder,
        action: ActionSpec::ApplyBindingPack(BindingConfigKey::Commercial),
        message: "Cardio is kept moderate while binding",
    },
    SafetyRule {
        id: "binding_long_duration",
        category: RuleCategory::Binding,
        severity: Severity::High,
        condition: Condition::LongBindingDuration,
        action: ActionSpec::ApplyBindingPack(BindingConfigKey::LongDuration),
        message: "You've been binding a long time today, so volume is trimmed and rests are longer",
    },
    SafetyRule {
        id: "binding_overhead_reduction",
        category: RuleCategory::Binding,
        severity: Severity::Moderate,
        condition: Condition::OverheadPressRisk,
        action: ActionSpec::ApplyBindingPack(BindingConfigKey::Overhead),
        message: "Overhead pressing volume is reduced while binding",
    },
    SafetyRule {
        id: "binding_break_checkpoint",
        category: RuleCategory::Binding,
        severity: Severity::High,
        condition: Condition::BindsChest,
        action: ActionSpec::InjectCheckpoint {
            kind: CheckpointKind::BinderBreak,
            trigger: TriggerSpec::EveryBinderInterval,
        },
        message: "Binder break: pause, take a few deep belly breaths, and loosen up for a minute",
    },
    SafetyRule {
        id: "binding_post_workout_reminder",
        category: RuleCategory::Binding,
        severity: Severity::Moderate,
        condition: Condition::BindsChest,
        action: ActionSpec::InjectCheckpoint {
            kind: CheckpointKind::PostWorkoutReminder,
            trigger: TriggerSpec::WorkoutCompletion,
        },
        message: "Get out of your binder as soon as you can after training and stretch your ribcage",
    },
];
