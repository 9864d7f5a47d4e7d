//! Shared fixtures for integration tests: deterministic profiles, a fast
//! config service over the in-memory store, and a fully wired generation
//! service.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use affirmfit::services::{
    AuditService, ExerciseLibraryService, PlanGenerationService, PlanService, ProfileService,
    SafetyConfigService,
};
use affirmfit::storage::MemoryStore;
use affirmfit::models::{
    BindingStatus, GenderIdentity, HrtStatus, PrimaryGoal, Profile,
};
use affirmfit::models::profile::ExperienceLevel;

pub fn today() -> NaiveDate {
    // A Monday.
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

pub fn generation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap()
}

pub fn full_equipment() -> BTreeSet<String> {
    [
        "none", "dumbbells", "barbell", "bench", "machine", "kettlebell", "bands",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn base_profile() -> Profile {
    Profile {
        user_id: Uuid::from_u128(0x1000),
        identity: GenderIdentity::NonBinary,
        primary_goal: PrimaryGoal::GeneralFitness,
        experience: ExperienceLevel::Intermediate,
        equipment: full_equipment(),
        session_durations: BTreeSet::from([30, 45, 60, 90]),
        hrt: HrtStatus::none(),
        binding: BindingStatus::not_binding(),
        surgeries: vec![],
        dysphoria_triggers: BTreeSet::new(),
        planning_ahead: false,
        created_at: generation_time(),
        updated_at: generation_time(),
    }
}

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub generation: PlanGenerationService,
    pub plans: PlanService,
    pub profiles: ProfileService,
    pub config: Arc<SafetyConfigService>,
}

pub fn harness() -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let config = Arc::new(SafetyConfigService::with_timing(
        store.clone(),
        Duration::from_secs(3600),
        Duration::from_millis(250),
    ));
    let plans = PlanService::new(store.clone());
    let audit = AuditService::new(store.clone(), true);
    let generation = PlanGenerationService::new(
        config.clone(),
        ExerciseLibraryService::builtin(),
        store.clone(),
        store.clone(),
        plans.clone(),
        audit,
    );
    TestHarness {
        profiles: ProfileService::new(store.clone()),
        store,
        generation,
        plans,
        config,
    }
}
