//! Config loader and cache behavior: TTL, fallback order, and the
//! guarantee that loading never fails the caller.

use std::sync::Arc;
use std::time::Duration;

use affirmfit::models::{HrtType, SafetyConfigRow, SurgeryType};
use affirmfit::services::{ConfigSource, SafetyConfigService};
use affirmfit::storage::MemoryStore;

fn estrogen_rows() -> Vec<SafetyConfigRow> {
    vec![SafetyConfigRow {
        rule_category: "hrt".to_string(),
        rule_id: "estrogen_phases".to_string(),
        config: serde_json::json!([
            {"name": "custom_early", "min_months": 0, "max_months": 6, "recovery_multiplier": 1.25},
            {"name": "custom_late", "min_months": 6, "recovery_multiplier": 1.4}
        ]),
        is_active: true,
    }]
}

#[tokio::test]
async fn load_returns_fresh_then_cached() {
    let store = Arc::new(MemoryStore::with_config_rows(estrogen_rows()));
    let service = SafetyConfigService::with_timing(
        store,
        Duration::from_secs(3600),
        Duration::from_millis(250),
    );

    let first = service.load().await;
    assert_eq!(first.source, ConfigSource::Fresh);
    assert_eq!(
        first.config.hrt_phase(HrtType::Estrogen, 2).unwrap().name,
        "custom_early"
    );

    let second = service.load().await;
    assert_eq!(second.source, ConfigSource::Cached);
}

#[tokio::test]
async fn fetch_failure_without_cache_degrades_to_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.fail_config_fetches(1);
    let service = SafetyConfigService::with_timing(
        store,
        Duration::from_secs(3600),
        Duration::from_millis(250),
    );

    let loaded = service.load().await;
    assert_eq!(loaded.source, ConfigSource::Defaults);
    assert!(loaded.source.is_degraded());
    // Defaults are complete.
    assert!(!loaded.config.post_op(SurgeryType::TopSurgery).is_empty());
    assert!(loaded.config.hrt_phase(HrtType::Testosterone, 0).is_some());
}

#[tokio::test]
async fn fetch_failure_with_cache_returns_the_stale_config() {
    let store = Arc::new(MemoryStore::with_config_rows(estrogen_rows()));
    // Zero TTL forces a refresh attempt on every load.
    let service = SafetyConfigService::with_timing(
        store.clone(),
        Duration::ZERO,
        Duration::from_millis(250),
    );

    let first = service.load().await;
    assert_eq!(first.source, ConfigSource::Fresh);

    store.fail_config_fetches(1);
    let second = service.load().await;
    assert_eq!(second.source, ConfigSource::Stale);
    assert_eq!(
        second.config.hrt_phase(HrtType::Estrogen, 2).unwrap().name,
        "custom_early"
    );
}

#[tokio::test]
async fn clear_cache_forces_a_refetch() {
    let store = Arc::new(MemoryStore::with_config_rows(estrogen_rows()));
    let service = SafetyConfigService::with_timing(
        store.clone(),
        Duration::from_secs(3600),
        Duration::from_millis(250),
    );

    let first = service.load().await;
    assert_eq!(first.source, ConfigSource::Fresh);

    store.set_config_rows(vec![]);
    service.clear_cache().await;

    let reloaded = service.load().await;
    assert_eq!(reloaded.source, ConfigSource::Fresh);
    // Rows gone, so the estrogen table reverts to defaults.
    assert_ne!(
        reloaded.config.hrt_phase(HrtType::Estrogen, 2).unwrap().name,
        "custom_early"
    );
}

#[tokio::test]
async fn concurrent_loads_collapse_to_one_fetch() {
    let store = Arc::new(MemoryStore::with_config_rows(estrogen_rows()));
    let service = Arc::new(SafetyConfigService::with_timing(
        store,
        Duration::from_secs(3600),
        Duration::from_millis(250),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.load().await }));
    }

    let mut fresh = 0;
    for handle in handles {
        let loaded = handle.await.unwrap();
        assert!(!loaded.source.is_degraded());
        if loaded.source == ConfigSource::Fresh {
            fresh += 1;
        }
        assert!(loaded.config.hrt_phase(HrtType::Estrogen, 10).is_some());
    }
    // Exactly one task performed the fetch; the rest observed the cache.
    assert_eq!(fresh, 1);
}
