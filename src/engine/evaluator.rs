//! Rule evaluation.
//!
//! Two-phase design: phase one runs every rule's pure predicate to collect
//! the firing set; phase two resolves each fired rule's action against the
//! loaded config. Evaluation never fails — a predicate or resolver that
//! panics drops that rule with a diagnostic, and an unresolvable action
//! contributes an empty modification. The engine never silently relaxes
//! safety.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

use crate::error::EngineError;
use crate::models::exercise::{Exercise, Intensity, MovementPattern, RecoveryPhase};
use crate::models::profile::{HrtType, Profile, PrimaryGoal};
use crate::models::safety::{
    Checkpoint, CheckpointTrigger, CriticalBlock, ParameterSet, RuleApplication, SafetyContext,
    SoftFilter,
};
use crate::models::safety_config::{DysphoriaFilterType, SafetyConfig};

use super::rules::{post_op, rule_table, ActionSpec, Condition, SafetyRule, TriggerSpec};

/// Inputs to one evaluation run. `now` is injected so identical inputs
/// produce identical outputs, audit timestamps included.
pub struct EvaluationContext<'a> {
    pub profile: &'a Profile,
    pub exercises: &'a [Exercise],
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

enum Effect {
    Block(CriticalBlock),
    Exclude(BTreeSet<i32>),
    Modify(ParameterSet),
    Checkpoint(Checkpoint),
    Soft(SoftFilter),
}

pub struct RulesEngine {
    config: Arc<SafetyConfig>,
}

impl RulesEngine {
    pub fn new(config: Arc<SafetyConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Evaluate the full rule table against a context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> SafetyContext {
        // Phase one: pure predicates decide which rules fire.
        let fired: Vec<&'static SafetyRule> = rule_table()
            .into_iter()
            .filter(|rule| {
                catch_unwind(AssertUnwindSafe(|| {
                    condition_holds(&rule.condition, ctx, &self.config)
                }))
                .unwrap_or_else(|_| {
                    let error = EngineError::RuleEvaluation {
                        rule_id: rule.id.to_string(),
                        reason: "predicate panicked".to_string(),
                    };
                    warn!(%error, "rule dropped");
                    false
                })
            })
            .collect();

        // Phase two: resolve each fired rule's action against config.
        let mut out = SafetyContext::default();
        for rule in fired {
            let effects = catch_unwind(AssertUnwindSafe(|| self.resolve(rule, ctx)))
                .unwrap_or_else(|_| {
                    let error = EngineError::RuleEvaluation {
                        rule_id: rule.id.to_string(),
                        reason: "action resolver panicked".to_string(),
                    };
                    warn!(%error, "empty modification substituted");
                    vec![]
                });

            let action_label = effects
                .first()
                .map(effect_label)
                .unwrap_or("modify_parameters");

            for effect in effects {
                match effect {
                    Effect::Block(block) => {
                        if !block.is_empty() {
                            out.critical_blocks.push(block);
                        }
                    }
                    Effect::Exclude(ids) => out.excluded_exercise_ids.extend(ids),
                    Effect::Modify(params) => out.modified_parameters.merge_from(&params),
                    Effect::Checkpoint(checkpoint) => out.required_checkpoints.push(checkpoint),
                    Effect::Soft(filter) => out.soft_filters.push(filter),
                }
            }

            out.rules_applied.push(RuleApplication {
                rule_id: rule.id.to_string(),
                category: rule.category,
                severity: rule.severity,
                action: action_label.to_string(),
                message: render_message(rule, ctx),
                user_id: ctx.profile.user_id,
                applied_at: ctx.now,
            });
        }
        out
    }

    fn resolve(&self, rule: &SafetyRule, ctx: &EvaluationContext) -> Vec<Effect> {
        let profile = ctx.profile;
        let config = &self.config;
        match &rule.action {
            ActionSpec::CriticalBlockFromPhase(surgery) => {
                let Some(record) = profile.active_surgery(*surgery) else {
                    return vec![];
                };
                let weeks = record.weeks_post_op(ctx.today);
                let Some(phase) = config.post_op_phase(*surgery, weeks) else {
                    return vec![];
                };
                let mut effects = vec![Effect::Block(CriticalBlock {
                    patterns: phase.blocked_patterns.clone(),
                    muscle_groups: phase.blocked_muscle_groups.clone(),
                    exercise_ids: vec![],
                })];
                // Phase parameters still apply alongside the block.
                let params = post_op_phase_params(phase);
                if !params.is_empty() {
                    effects.push(Effect::Modify(params));
                }
                effects
            }
            ActionSpec::ExcludeUnsafeForBinding => {
                let ids = ctx
                    .exercises
                    .iter()
                    .filter(|e| {
                        (!e.binder_aware && !e.heavy_binding_safe)
                            || (e.pattern == MovementPattern::Cardio
                                && e.intensity >= Intensity::High)
                            || e.plyometric
                    })
                    .map(|e| e.id)
                    .collect();
                vec![Effect::Exclude(ids)]
            }
            ActionSpec::ExcludeNotPelvicFloorSafe => {
                let ids = ctx
                    .exercises
                    .iter()
                    .filter(|e| !e.pelvic_floor_safe)
                    .map(|e| e.id)
                    .collect();
                vec![Effect::Exclude(ids)]
            }
            ActionSpec::ExcludeContraindicated(tag) => {
                let ids = ctx
                    .exercises
                    .iter()
                    .filter(|e| e.has_contraindication(tag))
                    .map(|e| e.id)
                    .collect();
                vec![Effect::Exclude(ids)]
            }
            ActionSpec::ExcludeBelowEarliestPhase => {
                let Some(current) = current_recovery_phase(profile, ctx.today) else {
                    return vec![];
                };
                let ids = ctx
                    .exercises
                    .iter()
                    .filter(|e| match e.earliest_safe_phase {
                        // Absence of evidence is not evidence of safety.
                        None => true,
                        Some(earliest) => earliest > current,
                    })
                    .map(|e| e.id)
                    .collect();
                vec![Effect::Exclude(ids)]
            }
            ActionSpec::ApplyBindingPack(key) => {
                let Some(pack) = config.binding(*key) else {
                    return vec![];
                };
                vec![Effect::Modify(ParameterSet {
                    volume_reduction_percent: pack.volume_reduction_percent,
                    rest_seconds_increase: pack.rest_seconds_increase,
                    max_workout_minutes: pack.max_workout_minutes,
                    suggested_intensity: pack.suggested_intensity,
                    max_sets: pack.max_sets,
                    ..Default::default()
                })]
            }
            ActionSpec::ApplyPostOpPhaseParams(surgery) => {
                let Some(record) = profile.active_surgery(*surgery) else {
                    return vec![];
                };
                let weeks = record.weeks_post_op(ctx.today);
                let Some(phase) = config.post_op_phase(*surgery, weeks) else {
                    return vec![];
                };
                vec![Effect::Modify(post_op_phase_params(phase))]
            }
            ActionSpec::ApplyHrtPhaseParams(hrt_type) => {
                let Some(phase) = config.hrt_phase(*hrt_type, profile.hrt.months) else {
                    return vec![];
                };
                vec![Effect::Modify(ParameterSet {
                    volume_reduction_percent: phase.volume_reduction_percent,
                    rest_seconds_increase: phase.rest_seconds_increase,
                    rest_seconds_reduction: phase.rest_seconds_reduction,
                    recovery_multiplier: phase.recovery_multiplier,
                    progressive_overload_rate: phase.progressive_overload_rate,
                    ..Default::default()
                })]
            }
            ActionSpec::ApplyBodyDistribution { feminization } => {
                let dist = if *feminization {
                    config.mtf_feminization
                } else {
                    config.ftm_masculinization
                };
                vec![Effect::Modify(ParameterSet {
                    lower_body_volume_percent: Some(dist.lower_percent),
                    upper_body_volume_percent: Some(dist.upper_percent),
                    ..Default::default()
                })]
            }
            ActionSpec::SoftenSession => vec![Effect::Modify(ParameterSet {
                suggested_intensity: Some(Intensity::Light),
                volume_reduction_percent: Some(20.0),
                ..Default::default()
            })],
            ActionSpec::InjectCheckpoint { kind, trigger } => {
                let trigger = match trigger {
                    TriggerSpec::WorkoutStart => CheckpointTrigger::WorkoutStart,
                    TriggerSpec::BeforeStrength => CheckpointTrigger::BeforeStrength,
                    TriggerSpec::CoolDown => CheckpointTrigger::CoolDown,
                    TriggerSpec::WorkoutCompletion => CheckpointTrigger::WorkoutCompletion,
                    TriggerSpec::EveryBinderInterval => {
                        CheckpointTrigger::EveryMinutes(config.binder_break_minutes)
                    }
                };
                vec![Effect::Checkpoint(Checkpoint {
                    kind: *kind,
                    trigger,
                    message: render_message(rule, ctx),
                    severity: rule.severity,
                })]
            }
            ActionSpec::ApplyDysphoriaConfig(trigger) => {
                let Some(entry) = config.dysphoria(*trigger) else {
                    return vec![];
                };
                match entry.filter_type {
                    DysphoriaFilterType::Exclude => {
                        let ids = ctx
                            .exercises
                            .iter()
                            .filter(|e| e.has_any_tag(&entry.exclude_tags))
                            .map(|e| e.id)
                            .collect();
                        vec![Effect::Exclude(ids)]
                    }
                    DysphoriaFilterType::Soft => vec![Effect::Soft(SoftFilter {
                        prefer_tags: entry.prefer_tags.clone(),
                        deprioritize_tags: entry.deprioritize_tags.clone(),
                        prefer_alternatives: true,
                    })],
                }
            }
        }
    }
}

fn effect_label(effect: &Effect) -> &'static str {
    match effect {
        Effect::Block(_) => "critical_block",
        Effect::Exclude(_) => "exclude_exercises",
        Effect::Modify(_) => "modify_parameters",
        Effect::Checkpoint(_) => "inject_checkpoint",
        Effect::Soft(_) => "soft_filter",
    }
}

fn post_op_phase_params(
    phase: &crate::models::safety_config::PostOpPhaseConfig,
) -> ParameterSet {
    ParameterSet {
        volume_reduction_percent: phase.volume_reduction_percent,
        max_sets: phase.max_sets,
        max_weight: phase.max_weight.clone(),
        rep_range: phase.rep_range.clone(),
        rest_seconds_increase: phase.rest_seconds_increase,
        ..Default::default()
    }
}

/// The user's current recovery phase: the most restrictive phase across all
/// unhealed surgeries. `None` when nothing is healing.
pub fn current_recovery_phase(profile: &Profile, today: NaiveDate) -> Option<RecoveryPhase> {
    profile
        .unhealed_surgeries()
        .iter()
        .map(|s| post_op::recovery_phase(s.weeks_post_op(today)))
        .min()
}

/// Whether a rule's condition holds. Pure in the context and config.
fn condition_holds(condition: &Condition, ctx: &EvaluationContext, config: &SafetyConfig) -> bool {
    let profile = ctx.profile;
    match condition {
        Condition::BindsChest => profile.binding.binds,
        Condition::RiskyBinder => profile.binding.binds && profile.binding.kind().is_high_risk(),
        Condition::StandardBinder => {
            profile.binding.binds && !profile.binding.kind().is_high_risk()
        }
        Condition::LongBindingDuration => {
            profile.binding.binds
                && profile.binding.hours() >= config.long_binding_threshold_hours()
        }
        Condition::OverheadPressRisk => {
            profile.binding.binds
                && (profile.binding.hours() >= config.overhead_threshold_hours()
                    || profile.binding.kind() == crate::models::profile::BinderKind::AceBandage)
        }
        Condition::PostOpBlockedPhase(surgery) => profile
            .active_surgery(*surgery)
            .and_then(|r| config.post_op_phase(*surgery, r.weeks_post_op(ctx.today)))
            .map_or(false, |phase| phase.has_blocks()),
        Condition::PostOpAdjustmentPhase(surgery) => profile
            .active_surgery(*surgery)
            .and_then(|r| config.post_op_phase(*surgery, r.weeks_post_op(ctx.today)))
            .map_or(false, |phase| !phase.has_blocks()),
        Condition::PostOpWithinWeeks { surgery, weeks } => profile
            .active_surgery(*surgery)
            .map_or(false, |r| r.weeks_post_op(ctx.today) < *weeks),
        Condition::AnyUnhealedSurgery => profile.has_unhealed_surgery(),
        Condition::HrtPhaseActive(hrt_type) => {
            profile.hrt.hrt_type == *hrt_type
                && config.hrt_phase(*hrt_type, profile.hrt.months).is_some()
        }
        Condition::FeminizationDistribution => {
            profile.primary_goal == PrimaryGoal::Feminization
                && matches!(profile.hrt.hrt_type, HrtType::Estrogen | HrtType::Both)
                && profile.hrt.months >= 3
        }
        Condition::MasculinizationDistribution => {
            profile.primary_goal == PrimaryGoal::Masculinization
                && matches!(profile.hrt.hrt_type, HrtType::Testosterone | HrtType::Both)
                && profile.hrt.months >= 3
        }
        Condition::EarlyTendonRisk => {
            matches!(profile.hrt.hrt_type, HrtType::Testosterone | HrtType::Both)
                && profile.hrt.months < 3
        }
        // The explicit weekday list is authoritative. Absent list means no
        // softening, even for non-daily frequencies.
        Condition::InjectionDay => {
            profile.hrt.is_active()
                && profile
                    .hrt
                    .days
                    .as_ref()
                    .map_or(false, |days| days.contains(&ctx.today.weekday()))
        }
        Condition::DysphoriaTriggerActive(trigger) => {
            profile.dysphoria_triggers.contains(trigger)
        }
    }
}

/// Substitute `{weeksPostOp}` and `{hrtMonths}` message tokens.
fn render_message(rule: &SafetyRule, ctx: &EvaluationContext) -> String {
    let mut message = rule.message.to_string();
    if message.contains("{weeksPostOp}") {
        let weeks = post_op::rule_surgery(rule.id)
            .and_then(|surgery| ctx.profile.active_surgery(surgery))
            .map(|r| r.weeks_post_op(ctx.today))
            .unwrap_or(0);
        message = message.replace("{weeksPostOp}", &weeks.to_string());
    }
    if message.contains("{hrtMonths}") {
        message = message.replace("{hrtMonths}", &ctx.profile.hrt.months.to_string());
    }
    message
}
