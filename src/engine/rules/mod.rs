//! The declarative safety rule set.
//!
//! Rules are a flat, ordered table of tagged variants rather than closures:
//! a pure `Condition` decides whether a rule fires, and an `ActionSpec` is
//! resolved against config afterwards. Category order is fixed (binding,
//! post-operative, HRT, dysphoria); the parameter merge is commutative, so
//! the order only affects audit readability.

pub mod binding;
pub mod dysphoria;
pub mod hrt;
pub mod post_op;

use crate::models::profile::{DysphoriaTrigger, HrtType, SurgeryType};
use crate::models::safety::{CheckpointKind, RuleCategory, Severity};
use crate::models::safety_config::BindingConfigKey;

/// Pure predicate over the evaluation context. Evaluated in phase one;
/// no config-dependent side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    BindsChest,
    /// Binding with an ace bandage or DIY binder.
    RiskyBinder,
    /// Binding with a purpose-made (commercial or sports) binder.
    StandardBinder,
    /// Binding hours at or past the configured long-duration threshold.
    LongBindingDuration,
    /// Binding hours past the overhead threshold, or ace-bandage binding.
    OverheadPressRisk,
    /// The current post-op phase for this surgery carries blocked patterns
    /// or muscle groups.
    PostOpBlockedPhase(SurgeryType),
    /// The current post-op phase carries only parameter adjustments.
    PostOpAdjustmentPhase(SurgeryType),
    /// An unhealed surgery of this type is under `weeks` weeks post-op.
    PostOpWithinWeeks { surgery: SurgeryType, weeks: u32 },
    AnyUnhealedSurgery,
    /// On this HRT type with a matching phase in config.
    HrtPhaseActive(HrtType),
    /// Feminization goal, estrogen or dual HRT, three months in.
    FeminizationDistribution,
    /// Masculinization goal, testosterone or dual HRT, three months in.
    MasculinizationDistribution,
    /// Testosterone or dual HRT under three months.
    EarlyTendonRisk,
    /// Today appears in the profile's explicit HRT administration days.
    InjectionDay,
    DysphoriaTriggerActive(DysphoriaTrigger),
}

/// Checkpoint placement, resolved to a concrete trigger against config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSpec {
    WorkoutStart,
    BeforeStrength,
    CoolDown,
    WorkoutCompletion,
    /// Recurring break at the configured binder-break interval.
    EveryBinderInterval,
}

/// What a fired rule does, resolved against config in phase two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSpec {
    /// Categorical prohibition from the surgery's current phase table.
    CriticalBlockFromPhase(SurgeryType),
    /// Remove exercises unsafe under compression: neither binder-aware nor
    /// heavy-binding-safe, high-intensity cardio, or plyometric.
    ExcludeUnsafeForBinding,
    ExcludeNotPelvicFloorSafe,
    /// Remove exercises carrying the named contraindication.
    ExcludeContraindicated(&'static str),
    /// Post-op gate: remove exercises whose earliest safe phase has not been
    /// reached, or that carry none at all.
    ExcludeBelowEarliestPhase,
    ApplyBindingPack(BindingConfigKey),
    ApplyPostOpPhaseParams(SurgeryType),
    ApplyHrtPhaseParams(HrtType),
    ApplyBodyDistribution { feminization: bool },
    /// Injection-day softening: light intensity, 20% volume cut.
    SoftenSession,
    InjectCheckpoint { kind: CheckpointKind, trigger: TriggerSpec },
    /// Exclude or soft-filter per the trigger's dysphoria config.
    ApplyDysphoriaConfig(DysphoriaTrigger),
}

#[derive(Debug, Clone, Copy)]
pub struct SafetyRule {
    pub id: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub condition: Condition,
    pub action: ActionSpec,
    /// User-facing message. May carry `{weeksPostOp}` and `{hrtMonths}`
    /// tokens, substituted at resolution time.
    pub message: &'static str,
}

/// The full rule table in evaluation order.
pub fn rule_table() -> Vec<&'static SafetyRule> {
    binding::RULES
        .iter()
        .chain(post_op::rules().iter())
        .chain(hrt::RULES.iter())
        .chain(dysphoria::RULES.iter())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_unique() {
        let table = rule_table();
        let mut ids: Vec<&str> = table.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn categories_appear_in_fixed_order() {
        use crate::models::safety::RuleCategory::*;
        let order = [Binding, PostOp, Hrt, Dysphoria];
        let table = rule_table();
        let mut last = 0;
        for rule in table {
            let pos = order.iter().position(|c| *c == rule.category).unwrap();
            assert!(pos >= last, "rule {} out of category order", rule.id);
            last = pos;
        }
    }
}
