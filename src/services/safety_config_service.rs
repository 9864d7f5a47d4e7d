//! Config loader and cache.
//!
//! Presents a typed, complete `SafetyConfig` to the engine and hides the
//! backing store. Loading never fails the caller: a fetch error or timeout
//! degrades to the last successful cache, and to the built-in conservative
//! defaults when nothing has ever loaded.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::models::safety_config::{
    conservative_defaults, BindingConfig, BindingConfigKey, BodyDistribution, DysphoriaConfig,
    HrtPhaseConfig, PostOpPhaseConfig, SafetyConfig, SafetyConfigRow,
};
use crate::models::profile::SurgeryType;
use crate::storage::ConfigStore;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a loaded config came from, surfaced as a soft warning when the
/// store was unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Fresh,
    Cached,
    /// Store unreachable; last successful load returned.
    Stale,
    /// Store unreachable and never loaded; built-in defaults returned.
    Defaults,
}

impl ConfigSource {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ConfigSource::Stale | ConfigSource::Defaults)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Arc<SafetyConfig>,
    pub source: ConfigSource,
}

struct CacheEntry {
    config: Arc<SafetyConfig>,
    loaded_at: Instant,
}

pub struct SafetyConfigService {
    store: Arc<dyn ConfigStore>,
    ttl: Duration,
    fetch_timeout: Duration,
    cache: RwLock<Option<CacheEntry>>,
    // Collapses concurrent refreshes into one in-flight fetch.
    refresh: Mutex<()>,
}

impl SafetyConfigService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::with_timing(store, DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timing(store: Arc<dyn ConfigStore>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            fetch_timeout,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Load the current config. Returns the cache while it is younger than
    /// the TTL; otherwise refreshes. Never returns an error.
    pub async fn load(&self) -> LoadedConfig {
        if let Some(entry) = self.fresh_entry().await {
            return LoadedConfig {
                config: entry,
                source: ConfigSource::Cached,
            };
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited on the guard.
        if let Some(entry) = self.fresh_entry().await {
            return LoadedConfig {
                config: entry,
                source: ConfigSource::Cached,
            };
        }

        match tokio::time::timeout(self.fetch_timeout, self.store.fetch_rows()).await {
            Ok(Ok(rows)) => {
                let config = Arc::new(normalize(rows));
                *self.cache.write().await = Some(CacheEntry {
                    config: config.clone(),
                    loaded_at: Instant::now(),
                });
                debug!("safety config refreshed");
                LoadedConfig {
                    config,
                    source: ConfigSource::Fresh,
                }
            }
            Ok(Err(error)) => {
                warn!(%error, "safety config fetch failed");
                self.degraded().await
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "safety config fetch timed out"
                );
                self.degraded().await
            }
        }
    }

    /// Drop the cache. For tests.
    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
    }

    async fn fresh_entry(&self) -> Option<Arc<SafetyConfig>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|e| e.loaded_at.elapsed() < self.ttl)
            .map(|e| e.config.clone())
    }

    async fn degraded(&self) -> LoadedConfig {
        let cache = self.cache.read().await;
        match cache.as_ref() {
            Some(entry) => LoadedConfig {
                config: entry.config.clone(),
                source: ConfigSource::Stale,
            },
            None => LoadedConfig {
                config: Arc::new(conservative_defaults()),
                source: ConfigSource::Defaults,
            },
        }
    }
}

/// Normalize raw rows into a typed config. Starts from the conservative
/// defaults and overlays each recognized row, so a partial store still
/// yields a complete config. Malformed rows are skipped with a diagnostic,
/// never surfaced to the caller.
pub fn normalize(rows: Vec<SafetyConfigRow>) -> SafetyConfig {
    let mut config = conservative_defaults();

    for row in rows {
        if !row.is_active {
            continue;
        }
        let applied = apply_row(&mut config, &row);
        if let Err(error) = applied {
            warn!(
                category = %row.rule_category,
                rule_id = %row.rule_id,
                %error,
                "skipping malformed config row"
            );
        }
    }

    config.hrt_estrogen_phases =
        validate_hrt_phases("estrogen", std::mem::take(&mut config.hrt_estrogen_phases));
    config.hrt_testosterone_phases = validate_hrt_phases(
        "testosterone",
        std::mem::take(&mut config.hrt_testosterone_phases),
    );
    config.hrt_dual_phases =
        validate_hrt_phases("dual", std::mem::take(&mut config.hrt_dual_phases));

    let surgeries: Vec<SurgeryType> = config.post_op.keys().copied().collect();
    for surgery in surgeries {
        let phases = config.post_op.remove(&surgery).unwrap_or_default();
        config
            .post_op
            .insert(surgery, validate_post_op_phases(surgery, phases));
    }

    config
}

fn apply_row(config: &mut SafetyConfig, row: &SafetyConfigRow) -> Result<()> {
    match (row.rule_category.as_str(), row.rule_id.as_str()) {
        ("hrt", "estrogen_phases") => {
            config.hrt_estrogen_phases = serde_json::from_value(row.config.clone())?;
        }
        ("hrt", "testosterone_phases") => {
            config.hrt_testosterone_phases = serde_json::from_value(row.config.clone())?;
        }
        ("hrt", "dual_phases") => {
            config.hrt_dual_phases = serde_json::from_value(row.config.clone())?;
        }
        ("hrt", "body_distribution") => {
            #[derive(serde::Deserialize)]
            struct Distribution {
                mtf_feminization: BodyDistribution,
                ftm_masculinization: BodyDistribution,
            }
            let dist: Distribution = serde_json::from_value(row.config.clone())?;
            config.mtf_feminization = dist.mtf_feminization;
            config.ftm_masculinization = dist.ftm_masculinization;
        }
        ("binding", "break_interval") => {
            #[derive(serde::Deserialize)]
            struct Interval {
                minutes: u32,
            }
            let interval: Interval = serde_json::from_value(row.config.clone())?;
            config.binder_break_minutes = interval.minutes;
        }
        ("binding", key) => {
            let key: BindingConfigKey =
                serde_json::from_value(serde_json::Value::String(key.to_string()))?;
            let pack: BindingConfig = serde_json::from_value(row.config.clone())?;
            config.binding.insert(key, pack);
        }
        ("post_op", surgery) => {
            let surgery: SurgeryType =
                serde_json::from_value(serde_json::Value::String(surgery.to_string()))?;
            let phases: Vec<PostOpPhaseConfig> = serde_json::from_value(row.config.clone())?;
            config.post_op.insert(surgery, phases);
        }
        ("dysphoria", _) => {
            let entry: DysphoriaConfig = serde_json::from_value(row.config.clone())?;
            config.dysphoria.retain(|d| d.trigger != entry.trigger);
            config.dysphoria.push(entry);
        }
        (category, rule_id) => {
            warn!(category, rule_id, "unrecognized config row");
        }
    }
    Ok(())
}

/// Enforce non-overlapping, ordered half-open intervals. On overlap, the
/// first phase wins and the later one is dropped with a diagnostic.
fn validate_hrt_phases(label: &str, phases: Vec<HrtPhaseConfig>) -> Vec<HrtPhaseConfig> {
    let mut kept: Vec<HrtPhaseConfig> = Vec::with_capacity(phases.len());
    for phase in phases {
        let overlaps = kept
            .last()
            .map_or(false, |prev| match prev.max_months {
                Some(end) => phase.min_months < end,
                None => true,
            });
        if overlaps {
            warn!(hrt = label, phase = %phase.name, "overlapping HRT phase dropped");
        } else {
            kept.push(phase);
        }
    }
    kept
}

fn validate_post_op_phases(
    surgery: SurgeryType,
    phases: Vec<PostOpPhaseConfig>,
) -> Vec<PostOpPhaseConfig> {
    let mut kept: Vec<PostOpPhaseConfig> = Vec::with_capacity(phases.len());
    for phase in phases {
        let overlaps = kept
            .last()
            .map_or(false, |prev| match prev.weeks_end {
                Some(end) => phase.weeks_start < end,
                None => true,
            });
        if overlaps {
            warn!(?surgery, phase = %phase.name, "overlapping post-op phase dropped");
        } else {
            kept.push(phase);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_phases_keep_the_first() {
        let phases = vec![
            HrtPhaseConfig {
                name: "a".to_string(),
                min_months: 0,
                max_months: Some(6),
                ..Default::default()
            },
            HrtPhaseConfig {
                name: "b".to_string(),
                min_months: 3,
                max_months: Some(12),
                ..Default::default()
            },
            HrtPhaseConfig {
                name: "c".to_string(),
                min_months: 6,
                max_months: None,
                ..Default::default()
            },
        ];
        let kept = validate_hrt_phases("test", phases);
        let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn normalize_overlays_rows_onto_defaults() {
        let rows = vec![SafetyConfigRow {
            rule_category: "binding".to_string(),
            rule_id: "ace_bandage".to_string(),
            config: serde_json::json!({
                "volume_reduction_percent": 50.0,
                "max_workout_minutes": 25,
                "suggested_intensity": "very_light"
            }),
            is_active: true,
        }];
        let config = normalize(rows);
        let pack = config.binding(BindingConfigKey::AceBandage).unwrap();
        assert_eq!(pack.max_workout_minutes, Some(25));
        // Untouched tables keep their defaults.
        assert!(config.binding(BindingConfigKey::Commercial).is_some());
        assert!(!config.hrt_estrogen_phases.is_empty());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![SafetyConfigRow {
            rule_category: "post_op".to_string(),
            rule_id: "top_surgery".to_string(),
            config: serde_json::json!({"not": "a phase list"}),
            is_active: true,
        }];
        let config = normalize(rows);
        // Defaults survive the bad row.
        assert!(!config.post_op(SurgeryType::TopSurgery).is_empty());
    }
}
