//! Hormone-therapy rules.

use super::{ActionSpec, Condition, SafetyRule, TriggerSpec};
use crate::models::profile::HrtType;
use crate::models::safety::{CheckpointKind, RuleCategory, Severity};

pub static RULES: &[SafetyRule] = &[
    SafetyRule {
        id: "hrt_estrogen_phase",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::HrtPhaseActive(HrtType::Estrogen),
        action: ActionSpec::ApplyHrtPhaseParams(HrtType::Estrogen),
        message: "Recovery windows are tuned for {hrtMonths} months on estrogen",
    },
    SafetyRule {
        id: "hrt_testosterone_phase",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::HrtPhaseActive(HrtType::Testosterone),
        action: ActionSpec::ApplyHrtPhaseParams(HrtType::Testosterone),
        message: "Programming reflects {hrtMonths} months on testosterone",
    },
    SafetyRule {
        id: "hrt_dual_phase",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::HrtPhaseActive(HrtType::Both),
        action: ActionSpec::ApplyHrtPhaseParams(HrtType::Both),
        message: "Programming reflects {hrtMonths} months on combined hormone therapy",
    },
    SafetyRule {
        id: "hrt_feminization_distribution",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::FeminizationDistribution,
        action: ActionSpec::ApplyBodyDistribution { feminization: true },
        message: "Weekly volume is shifted toward the lower body for feminization",
    },
    SafetyRule {
        id: "hrt_masculinization_distribution",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::MasculinizationDistribution,
        action: ActionSpec::ApplyBodyDistribution { feminization: false },
        message: "Weekly volume is shifted toward the upper body for masculinization",
    },
    SafetyRule {
        id: "hrt_tendon_adaptation",
        category: RuleCategory::Hrt,
        severity: Severity::High,
        condition: Condition::EarlyTendonRisk,
        action: ActionSpec::InjectCheckpoint {
            kind: CheckpointKind::SafetyReminder,
            trigger: TriggerSpec::BeforeStrength,
        },
        message: "Muscles adapt faster than tendons in the first months of testosterone. Keep loads conservative and leave a rep in the tank",
    },
    SafetyRule {
        id: "hrt_injection_day",
        category: RuleCategory::Hrt,
        severity: Severity::Moderate,
        condition: Condition::InjectionDay,
        action: ActionSpec::SoftenSession,
        message: "Injection day: today's session is kept light",
    },
];
