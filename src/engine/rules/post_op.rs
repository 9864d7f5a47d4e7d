//! Post-operative recovery rules.
//!
//! Each surgery type derives two rules from its phase table: a critical
//! rule while the current phase blocks patterns or muscle groups, and a
//! high rule while it only adjusts parameters. Specialized rules add
//! categorical exclusions tied to specific procedures.

use std::sync::OnceLock;

use super::{ActionSpec, Condition, SafetyRule, TriggerSpec};
use crate::models::exercise::RecoveryPhase;
use crate::models::profile::SurgeryType;
use crate::models::safety::{CheckpointKind, RuleCategory, Severity};

/// Weeks post-op mapped onto the ordered recovery phase chain. Pure in the
/// current and surgery dates; there is no mutable state.
pub fn recovery_phase(weeks: u32) -> RecoveryPhase {
    match weeks {
        0..=1 => RecoveryPhase::Immediate,
        2..=5 => RecoveryPhase::Early,
        6..=11 => RecoveryPhase::Mid,
        12..=25 => RecoveryPhase::Late,
        _ => RecoveryPhase::Maintenance,
    }
}

/// Surgery associated with a rule id, for `{weeksPostOp}` substitution.
pub fn rule_surgery(rule_id: &str) -> Option<SurgeryType> {
    match rule_id {
        "post_op_top_surgery_critical"
        | "post_op_top_surgery_parameters"
        | "post_op_top_surgery_scar_care" => Some(SurgeryType::TopSurgery),
        "post_op_bottom_surgery_critical"
        | "post_op_bottom_surgery_parameters"
        | "post_op_bottom_surgery_pelvic_floor" => Some(SurgeryType::BottomSurgery),
        "post_op_vaginoplasty_critical"
        | "post_op_vaginoplasty_parameters"
        | "post_op_vaginoplasty_pelvic_floor" => Some(SurgeryType::Vaginoplasty),
        "post_op_phalloplasty_critical"
        | "post_op_phalloplasty_parameters"
        | "post_op_phalloplasty_donor_site" => Some(SurgeryType::Phalloplasty),
        "post_op_metoidioplasty_critical"
        | "post_op_metoidioplasty_parameters"
        | "post_op_metoidioplasty_pelvic_floor" => Some(SurgeryType::Metoidioplasty),
        "post_op_orchiectomy_critical" | "post_op_orchiectomy_parameters" => {
            Some(SurgeryType::Orchiectomy)
        }
        "post_op_hysterectomy_critical" | "post_op_hysterectomy_parameters" => {
            Some(SurgeryType::Hysterectomy)
        }
        "post_op_breast_augmentation_critical"
        | "post_op_breast_augmentation_parameters"
        | "post_op_breast_augmentation_stretch" => Some(SurgeryType::BreastAugmentation),
        "post_op_ffs_critical" | "post_op_ffs_parameters" | "post_op_ffs_forward_bend" => {
            Some(SurgeryType::Ffs)
        }
        _ => None,
    }
}

macro_rules! phase_rules {
    ($critical_id:literal, $params_id:literal, $surgery:expr) => {
        [
            SafetyRule {
                id: $critical_id,
                category: RuleCategory::PostOp,
                severity: Severity::Critical,
                condition: Condition::PostOpBlockedPhase($surgery),
                action: ActionSpec::CriticalBlockFromPhase($surgery),
                message: "At {weeksPostOp} weeks post-op, some movement patterns stay blocked while tissue heals",
            },
            SafetyRule {
                id: $params_id,
                category: RuleCategory::PostOp,
                severity: Severity::High,
                condition: Condition::PostOpAdjustmentPhase($surgery),
                action: ActionSpec::ApplyPostOpPhaseParams($surgery),
                message: "Training volume is adjusted for {weeksPostOp} weeks post-op",
            },
        ]
    };
}

static TOP: [SafetyRule; 2] = phase_rules!(
    "post_op_top_surgery_critical",
    "post_op_top_surgery_parameters",
    SurgeryType::TopSurgery
);
static BOTTOM: [SafetyRule; 2] = phase_rules!(
    "post_op_bottom_surgery_critical",
    "post_op_bottom_surgery_parameters",
    SurgeryType::BottomSurgery
);
static VAGINOPLASTY: [SafetyRule; 2] = phase_rules!(
    "post_op_vaginoplasty_critical",
    "post_op_vaginoplasty_parameters",
    SurgeryType::Vaginoplasty
);
static PHALLOPLASTY: [SafetyRule; 2] = phase_rules!(
    "post_op_phalloplasty_critical",
    "post_op_phalloplasty_parameters",
    SurgeryType::Phalloplasty
);
static METOIDIOPLASTY: [SafetyRule; 2] = phase_rules!(
    "post_op_metoidioplasty_critical",
    "post_op_metoidioplasty_parameters",
    SurgeryType::Metoidioplasty
);
static ORCHIECTOMY: [SafetyRule; 2] = phase_rules!(
    "post_op_orchiectomy_critical",
    "post_op_orchiectomy_parameters",
    SurgeryType::Orchiectomy
);
static HYSTERECTOMY: [SafetyRule; 2] = phase_rules!(
    "post_op_hysterectomy_critical",
    "post_op_hysterectomy_parameters",
    SurgeryType::Hysterectomy
);
static BREAST_AUG: [SafetyRule; 2] = phase_rules!(
    "post_op_breast_augmentation_critical",
    "post_op_breast_augmentation_parameters",
    SurgeryType::BreastAugmentation
);
static FFS: [SafetyRule; 2] = phase_rules!(
    "post_op_ffs_critical",
    "post_op_ffs_parameters",
    SurgeryType::Ffs
);

static SPECIALIZED: [SafetyRule; 7] = [
    SafetyRule {
        id: "post_op_bottom_surgery_pelvic_floor",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::BottomSurgery,
            weeks: 12,
        },
        action: ActionSpec::ExcludeNotPelvicFloorSafe,
        message: "Only pelvic-floor-safe exercises for the first 12 weeks after bottom surgery",
    },
    SafetyRule {
        id: "post_op_vaginoplasty_pelvic_floor",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::Vaginoplasty,
            weeks: 12,
        },
        action: ActionSpec::ExcludeNotPelvicFloorSafe,
        message: "Only pelvic-floor-safe exercises for the first 12 weeks after vaginoplasty",
    },
    SafetyRule {
        id: "post_op_metoidioplasty_pelvic_floor",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::Metoidioplasty,
            weeks: 8,
        },
        action: ActionSpec::ExcludeNotPelvicFloorSafe,
        message: "Only pelvic-floor-safe exercises while metoidioplasty heals",
    },
    SafetyRule {
        id: "post_op_ffs_forward_bend",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::Ffs,
            weeks: 6,
        },
        action: ActionSpec::ExcludeContraindicated("forward_bend"),
        message: "Forward-bending movements are avoided while facial surgery heals",
    },
    SafetyRule {
        id: "post_op_phalloplasty_donor_site",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::Phalloplasty,
            weeks: 12,
        },
        action: ActionSpec::ExcludeContraindicated("donor_site_stress"),
        message: "At {weeksPostOp} weeks after phalloplasty, movements loading the donor site are excluded",
    },
    SafetyRule {
        id: "post_op_breast_augmentation_stretch",
        category: RuleCategory::PostOp,
        severity: Severity::Critical,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::BreastAugmentation,
            weeks: 8,
        },
        action: ActionSpec::ExcludeContraindicated("chest_stretch"),
        message: "Chest stretches wait until your augmentation has healed",
    },
    SafetyRule {
        id: "post_op_top_surgery_scar_care",
        category: RuleCategory::PostOp,
        severity: Severity::Moderate,
        condition: Condition::PostOpWithinWeeks {
            surgery: SurgeryType::TopSurgery,
            weeks: 12,
        },
        action: ActionSpec::InjectCheckpoint {
            kind: CheckpointKind::ScarCare,
            trigger: TriggerSpec::CoolDown,
        },
        message: "Cool-down scar care: massage and moisturize your incision lines as advised by your surgeon",
    },
];

static PHASE_GATE: [SafetyRule; 1] = [SafetyRule {
    id: "post_op_recovery_phase_gate",
    category: RuleCategory::PostOp,
    severity: Severity::Critical,
    condition: Condition::AnyUnhealedSurgery,
    action: ActionSpec::ExcludeBelowEarliestPhase,
    message: "Exercises not yet cleared for your recovery stage are excluded",
}];

static TABLE: OnceLock<Vec<SafetyRule>> = OnceLock::new();

/// Every post-op rule: derived phase tables first, then specialized
/// exclusions, then the recovery-phase gate.
pub fn rules() -> &'static [SafetyRule] {
    TABLE.get_or_init(|| {
        let mut table = Vec::new();
        for group in [
            &TOP, &BOTTOM, &VAGINOPLASTY, &PHALLOPLASTY, &METOIDIOPLASTY, &ORCHIECTOMY,
            &HYSTERECTOMY, &BREAST_AUG, &FFS,
        ] {
            table.extend_from_slice(group.as_slice());
        }
        table.extend_from_slice(&SPECIALIZED);
        table.extend_from_slice(&PHASE_GATE);
        table
    })
}
