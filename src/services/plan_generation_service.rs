//! The plan assembler.
//!
//! Takes a profile snapshot, runs the rules engine, then builds a seven-day
//! plan: template selection, candidate filtering, scoring, greedy selection
//! with a stable comparator, parameter application, duration variants and
//! checkpoint timelines. Pure and deterministic between the config load and
//! the final save.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::templates::{
    fallback_patterns, template_for, weekly_rotation, DayTemplate, SlotRole,
};
use crate::engine::timeline::build_timeline;
use crate::engine::{EvaluationContext, RulesEngine};
use crate::error::EngineError;
use crate::models::{
    DayFocus, Exercise, ExercisePrescription, ExperienceLevel, Intensity, MovementPattern,
    ParameterSet, Plan, PlanDay, Profile, SafetyContext, Workout,
};
use crate::storage::{FeedbackStore, ProfileStore};
use crate::ENGINE_VERSION;

use super::audit_service::AuditService;
use super::exercise_library_service::ExerciseLibraryService;
use super::plan_service::PlanService;
use super::safety_config_service::SafetyConfigService;

/// At most this many selected exercises may share a target muscle group.
const MUSCLE_GROUP_CAP: u32 = 2;

/// Seconds of work assumed per set when estimating block minutes.
const SET_WORK_SECONDS: i32 = 40;

/// A soft degradation surfaced alongside a still-usable plan. Codes come
/// from `EngineError::error_code()` so the boundary contract has a single
/// source of truth.
#[derive(Debug, Clone)]
pub struct PlanWarning {
    pub code: &'static str,
    pub message: String,
}

impl PlanWarning {
    fn from_error(error: &EngineError, message: impl Into<String>) -> Self {
        Self {
            code: error.error_code(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub warnings: Vec<PlanWarning>,
}

#[derive(Clone)]
struct Scored {
    exercise: Exercise,
    score: f64,
}

#[derive(Clone)]
pub struct PlanGenerationService {
    config_service: Arc<SafetyConfigService>,
    library: ExerciseLibraryService,
    profile_store: Arc<dyn ProfileStore>,
    feedback_store: Arc<dyn FeedbackStore>,
    plan_service: PlanService,
    audit: AuditService,
}

impl PlanGenerationService {
    pub fn new(
        config_service: Arc<SafetyConfigService>,
        library: ExerciseLibraryService,
        profile_store: Arc<dyn ProfileStore>,
        feedback_store: Arc<dyn FeedbackStore>,
        plan_service: PlanService,
        audit: AuditService,
    ) -> Self {
        Self {
            config_service,
            library,
            profile_store,
            feedback_store,
            plan_service,
            audit,
        }
    }

    /// Generate a weekly plan for a stored profile.
    pub async fn generate_plan(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PlanOutcome, EngineError> {
        let profile = self
            .profile_store
            .get_profile(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))?
            .ok_or_else(|| EngineError::Validation("no profile for user".to_string()))?;
        self.generate_for_profile(&profile, start_date, now).await
    }

    /// Generate a weekly plan from a profile snapshot.
    pub async fn generate_for_profile(
        &self,
        profile: &Profile,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PlanOutcome, EngineError> {
        profile.validate(start_date)?;

        let mut warnings = Vec::new();
        let loaded = self.config_service.load().await;
        if loaded.source.is_degraded() {
            warnings.push(PlanWarning::from_error(
                &EngineError::Config("store unreachable".to_string()),
                "Safety configuration was unavailable; conservative defaults applied",
            ));
        }

        let engine = RulesEngine::new(loaded.config.clone());
        let ctx = EvaluationContext {
            profile,
            exercises: self.library.all(),
            today: start_date,
            now,
        };
        let safety = engine.evaluate(&ctx);
        info!(
            user_id = %profile.user_id,
            rules_fired = safety.rules_applied.len(),
            excluded = safety.excluded_exercise_ids.len(),
            "safety evaluation complete"
        );

        let feedback_weights = self.feedback_weights(profile.user_id).await;
        let scored = score_pool(self.library.all(), profile, &safety, &feedback_weights);

        if scored.is_empty() {
            warnings.push(PlanWarning::from_error(
                &EngineError::Assembly {
                    slot: "weekly plan".to_string(),
                },
                "No exercises in the library meet your current safety constraints; this week is programmed as rest",
            ));
        }

        let plan = self.assemble_plan(profile, &safety, &scored, start_date, now);

        let pool_ids: Vec<i32> = scored.iter().map(|s| s.exercise.id).collect();
        for day in &plan.days {
            if !day.focus.is_rest() {
                self.audit
                    .record_day(plan.id, day.day_number, &safety, &pool_ids, now)
                    .await;
            }
        }

        if let Err(error) = self.plan_service.save_with_retry(&plan).await {
            let message = format!("Plan could not be saved and is held in memory: {}", error);
            warnings.push(PlanWarning::from_error(&error, message));
        }

        Ok(PlanOutcome { plan, warnings })
    }

    /// Rebuild one day of an existing plan. Deterministic: with unchanged
    /// profile and config, the regenerated day equals the original.
    pub async fn regenerate_day(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
        day_number: u8,
    ) -> Result<Option<PlanOutcome>, EngineError> {
        let Some(plan) = self.plan_service.plan_by_id(plan_id, user_id).await? else {
            return Ok(None);
        };
        if plan.day(day_number).is_none() {
            return Ok(None);
        }
        let profile = self
            .profile_store
            .get_profile(user_id)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))?
            .ok_or_else(|| EngineError::Validation("no profile for user".to_string()))?;
        profile.validate(plan.start_date)?;

        let mut warnings = Vec::new();
        let loaded = self.config_service.load().await;
        if loaded.source.is_degraded() {
            warnings.push(PlanWarning::from_error(
                &EngineError::Config("store unreachable".to_string()),
                "Safety configuration was unavailable; conservative defaults applied",
            ));
        }

        let engine = RulesEngine::new(loaded.config.clone());
        let ctx = EvaluationContext {
            profile: &profile,
            exercises: self.library.all(),
            today: plan.start_date,
            now: plan.created_at,
        };
        let safety = engine.evaluate(&ctx);
        let feedback_weights = self.feedback_weights(user_id).await;
        let scored = score_pool(self.library.all(), &profile, &safety, &feedback_weights);

        let focus = weekly_rotation()[day_number as usize % 7];
        let date = plan.start_date + Duration::days(day_number as i64);
        let new_day = self.assemble_day(&profile, &safety, &scored, focus, date, day_number);

        let mut new_plan = plan.clone();
        if let Some(slot) = new_plan
            .days
            .iter_mut()
            .find(|d| d.day_number == day_number)
        {
            *slot = new_day;
        }

        let pool_ids: Vec<i32> = scored.iter().map(|s| s.exercise.id).collect();
        self.audit
            .record_day(new_plan.id, day_number, &safety, &pool_ids, plan.created_at)
            .await;

        if let Err(error) = self.plan_service.save_with_retry(&new_plan).await {
            let message = format!("Plan could not be saved and is held in memory: {}", error);
            warnings.push(PlanWarning::from_error(&error, message));
        }

        Ok(Some(PlanOutcome {
            plan: new_plan,
            warnings,
        }))
    }

    fn assemble_plan(
        &self,
        profile: &Profile,
        safety: &SafetyContext,
        scored: &[Scored],
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Plan {
        let rotation = weekly_rotation();
        let mut days = Vec::with_capacity(7);
        for day_number in 0..7u8 {
            let focus = rotation[day_number as usize];
            let date = start_date + Duration::days(day_number as i64);
            days.push(self.assemble_day(profile, safety, scored, focus, date, day_number));
        }

        Plan {
            id: plan_identifier(profile.user_id, start_date, now),
            user_id: profile.user_id,
            start_date,
            days,
            engine_version: ENGINE_VERSION.to_string(),
            created_at: now,
        }
    }

    fn assemble_day(
        &self,
        profile: &Profile,
        safety: &SafetyContext,
        scored: &[Scored],
        focus: DayFocus,
        date: NaiveDate,
        day_number: u8,
    ) -> PlanDay {
        let Some(template) = template_for(focus) else {
            return rest_day(profile, date, day_number, None);
        };
        if scored.is_empty() {
            return rest_day(
                profile,
                date,
                day_number,
                Some("No exercises meet your current safety constraints".to_string()),
            );
        }

        let selection = select_exercises(template, scored, profile.experience);
        if selection.is_empty() {
            debug!(?focus, "no pattern meets constraints, converting to rest");
            return rest_day(
                profile,
                date,
                day_number,
                Some(format!(
                    "{} day converted to rest: no movement pattern meets today's safety constraints",
                    template.name
                )),
            );
        }

        let params = &safety.modified_parameters;
        let mut variants: BTreeMap<u32, Option<Workout>> = BTreeMap::new();
        for &duration in &profile.session_durations {
            variants.insert(
                duration,
                Some(build_variant(
                    duration,
                    template,
                    &selection,
                    scored,
                    safety,
                    params,
                    profile.experience,
                )),
            );
        }

        PlanDay {
            date,
            day_number,
            focus,
            variants,
            note: None,
        }
    }

    /// Latest feedback flag per exercise, as a scoring weight.
    async fn feedback_weights(&self, user_id: Uuid) -> BTreeMap<i32, f64> {
        let mut weights = BTreeMap::new();
        match self.feedback_store.list_feedback(user_id).await {
            Ok(entries) => {
                for entry in entries {
                    weights.insert(entry.exercise_id, entry.flag.score_weight());
                }
            }
            Err(error) => {
                debug!(%error, "feedback unavailable, scoring without it");
            }
        }
        weights
    }
}

/// Stable plan identity for a (user, start date, generation time) triple.
fn plan_identifier(user_id: Uuid, start_date: NaiveDate, now: DateTime<Utc>) -> Uuid {
    let seed = format!("{}:{}:{}", user_id, start_date, now.timestamp_millis());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
}

fn rest_day(profile: &Profile, date: NaiveDate, day_number: u8, note: Option<String>) -> PlanDay {
    let variants = profile
        .session_durations
        .iter()
        .map(|&d| (d, None))
        .collect();
    PlanDay {
        date,
        day_number,
        focus: DayFocus::Rest,
        variants,
        note,
    }
}

/// Score the admissible pool. Order: score descending, then id ascending,
/// so selection is reproducible.
fn score_pool(
    library: &[Exercise],
    profile: &Profile,
    safety: &SafetyContext,
    feedback_weights: &BTreeMap<i32, f64>,
) -> Vec<Scored> {
    let mut scored: Vec<Scored> = library
        .iter()
        .filter(|e| safety.admits(e) && e.available_with(&profile.equipment))
        .map(|e| Scored {
            exercise: e.clone(),
            score: score_exercise(e, profile, safety, feedback_weights),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.exercise.id.cmp(&b.exercise.id))
    });
    scored
}

fn score_exercise(
    exercise: &Exercise,
    profile: &Profile,
    safety: &SafetyContext,
    feedback_weights: &BTreeMap<i32, f64>,
) -> f64 {
    let goal_weight = if exercise.gender_goal_emphasis.contains(&profile.primary_goal) {
        1.25
    } else {
        1.0
    };

    let mut soft_modifier = 1.0;
    for filter in &safety.soft_filters {
        if exercise.has_any_tag(&filter.prefer_tags) {
            soft_modifier *= 1.15;
        } else if exercise.has_any_tag(&filter.deprioritize_tags) {
            soft_modifier *= 0.65;
        }
    }

    let feedback = feedback_weights.get(&exercise.id).copied().unwrap_or(1.0);

    exercise.effectiveness_rating * goal_weight * soft_modifier * feedback
}

/// Greedy slot filling with a per-muscle-group cap. Downgrade ladder per
/// slot: regression to beginner variants, then nearest-pattern
/// substitution, then the slot is skipped.
fn select_exercises(
    template: &DayTemplate,
    scored: &[Scored],
    experience: ExperienceLevel,
) -> Vec<(Scored, SlotRole)> {
    let mut selected: Vec<(Scored, SlotRole)> = Vec::new();
    let mut muscle_counts: BTreeMap<String, u32> = BTreeMap::new();

    for slot in template.slots {
        for _ in 0..slot.count {
            let pick =
                find_candidate(scored, &selected, &muscle_counts, slot.patterns, experience, true)
                    .or_else(|| {
                        find_candidate(
                            scored,
                            &selected,
                            &muscle_counts,
                            slot.patterns,
                            ExperienceLevel::Beginner,
                            false,
                        )
                    })
                    .or_else(|| {
                        find_candidate(
                            scored,
                            &selected,
                            &muscle_counts,
                            fallback_patterns(slot.patterns[0]),
                            experience,
                            true,
                        )
                    });
            match pick {
                Some(candidate) => {
                    for muscle in &candidate.exercise.target_muscles {
                        *muscle_counts.entry(muscle.clone()).or_insert(0) += 1;
                    }
                    selected.push((candidate, slot.role));
                }
                None => continue,
            }
        }
    }
    selected
}

fn find_candidate(
    scored: &[Scored],
    selected: &[(Scored, SlotRole)],
    muscle_counts: &BTreeMap<String, u32>,
    patterns: &[MovementPattern],
    max_difficulty: ExperienceLevel,
    enforce_cap: bool,
) -> Option<Scored> {
    scored
        .iter()
        .find(|candidate| {
            patterns.contains(&candidate.exercise.pattern)
                && candidate.exercise.difficulty <= max_difficulty
                && !selected
                    .iter()
                    .any(|(s, _)| s.exercise.id == candidate.exercise.id)
                && (!enforce_cap
                    || candidate
                        .exercise
                        .target_muscles
                        .iter()
                        .all(|m| muscle_counts.get(m).copied().unwrap_or(0) < MUSCLE_GROUP_CAP))
        })
        .cloned()
}

/// Apply the merged parameter bag to a selected exercise.
fn prescribe(
    exercise: &Exercise,
    template: &DayTemplate,
    params: &ParameterSet,
) -> ExercisePrescription {
    let intensity = effective_intensity(template.default_intensity, params);
    match exercise.pattern {
        MovementPattern::Cardio => ExercisePrescription {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            sets: 1,
            reps: "12 min steady".to_string(),
            rest_seconds: 0,
            intensity,
            minutes: 12,
            notes: None,
        },
        MovementPattern::Mobility | MovementPattern::Stretch => ExercisePrescription {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            sets: 2,
            reps: "30-60s".to_string(),
            rest_seconds: 30,
            intensity: Intensity::VeryLight,
            minutes: 4,
            notes: None,
        },
        _ => {
            let reduction = params.volume_reduction_percent.unwrap_or(0.0);
            let mut sets =
                (template.default_sets as f64 * (1.0 - reduction / 100.0)).round() as u32;
            sets = sets.max(1);
            if let Some(max_sets) = params.max_sets {
                sets = sets.min(max_sets.max(1));
            }

            let rest = (template.default_rest_seconds
                + params.rest_seconds_increase.unwrap_or(0)
                - params.rest_seconds_reduction.unwrap_or(0))
            .max(30);

            let reps = params
                .rep_range
                .clone()
                .unwrap_or_else(|| template.default_reps.to_string());

            let block_seconds = sets as i32 * (SET_WORK_SECONDS + rest);
            let minutes = ((block_seconds + 59) / 60) as u32;

            ExercisePrescription {
                exercise_id: exercise.id,
                name: exercise.name.clone(),
                sets,
                reps,
                rest_seconds: rest,
                intensity,
                minutes,
                notes: params
                    .max_weight
                    .as_ref()
                    .map(|w| format!("Keep loads {}", w)),
            }
        }
    }
}

fn effective_intensity(default: Intensity, params: &ParameterSet) -> Intensity {
    match params.suggested_intensity {
        Some(suggested) => default.min(suggested),
        None => default,
    }
}

/// Size a workout to a duration target: trim lowest-scored accessories when
/// over budget, extend with next-best candidates when under.
fn build_variant(
    duration: u32,
    template: &DayTemplate,
    selection: &[(Scored, SlotRole)],
    scored: &[Scored],
    safety: &SafetyContext,
    params: &ParameterSet,
    experience: ExperienceLevel,
) -> Workout {
    let budget = match params.max_workout_minutes {
        Some(cap) => duration.min(cap),
        None => duration,
    };

    let mut chosen: Vec<(Scored, SlotRole)> = selection.to_vec();

    let mut total: u32 = chosen
        .iter()
        .map(|(s, _)| prescribe(&s.exercise, template, params).minutes)
        .sum();
    while total > budget && chosen.len() > 1 {
        let victim =
            lowest_scored_index(&chosen, false).or_else(|| lowest_scored_index(&chosen, true));
        match victim {
            Some(index) => {
                let (removed, _) = chosen.remove(index);
                total -= prescribe(&removed.exercise, template, params).minutes;
            }
            None => break,
        }
    }

    let template_patterns: Vec<MovementPattern> = template
        .slots
        .iter()
        .flat_map(|s| s.patterns.iter().copied())
        .collect();
    for candidate in scored {
        if total >= budget {
            break;
        }
        if !template_patterns.contains(&candidate.exercise.pattern) {
            continue;
        }
        if candidate.exercise.difficulty > experience {
            continue;
        }
        if chosen
            .iter()
            .any(|(s, _)| s.exercise.id == candidate.exercise.id)
        {
            continue;
        }
        let minutes = prescribe(&candidate.exercise, template, params).minutes;
        if total + minutes <= budget {
            chosen.push((candidate.clone(), SlotRole::Accessory));
            total += minutes;
        }
    }

    let prescriptions: Vec<ExercisePrescription> = chosen
        .iter()
        .map(|(s, _)| prescribe(&s.exercise, template, params))
        .collect();
    let patterns: Vec<MovementPattern> =
        chosen.iter().map(|(s, _)| s.exercise.pattern).collect();
    let total_minutes: u32 = prescriptions.iter().map(|p| p.minutes).sum();
    let timeline = build_timeline(&prescriptions, &patterns, &safety.required_checkpoints);

    Workout {
        name: template.name.to_string(),
        focus: template.focus,
        exercises: prescriptions,
        total_minutes,
        timeline,
        safety_context: safety.clone(),
        explanations: safety.explanations(),
    }
}

fn lowest_scored_index(chosen: &[(Scored, SlotRole)], include_compounds: bool) -> Option<usize> {
    chosen
        .iter()
        .enumerate()
        .filter(|(_, (_, role))| include_compounds || *role != SlotRole::Compound)
        .min_by(|(_, (a, _)), (_, (b, _))| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.exercise.id.cmp(&a.exercise.id))
        })
        .map(|(index, _)| index)
}
