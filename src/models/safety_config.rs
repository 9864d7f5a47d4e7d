use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::exercise::{Intensity, MovementPattern};
use super::profile::{DysphoriaTrigger, HrtType, SurgeryType};

/// One row of the backing config store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfigRow {
    pub rule_category: String,
    pub rule_id: String,
    pub config: serde_json::Value,
    pub is_active: bool,
}

/// Parameters for one HRT phase, indexed by a half-open month interval
/// `[min_months, max_months)`. `max_months = None` leaves the interval
/// unbounded above.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HrtPhaseConfig {
    pub name: String,
    pub min_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_increase: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_reduction: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progressive_overload_rate: Option<f64>,
    #[serde(default)]
    pub tendon_warning: bool,
}

impl HrtPhaseConfig {
    pub fn contains(&self, months: u32) -> bool {
        months >= self.min_months && self.max_months.map_or(true, |max| months < max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyDistribution {
    pub lower_percent: f64,
    pub upper_percent: f64,
}

/// Keys into the binding parameter tables. `LongDuration` and `Overhead`
/// are situational packs layered on top of the binder-type packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConfigKey {
    Commercial,
    AceBandage,
    Diy,
    LongDuration,
    Overhead,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_increase: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workout_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_threshold_hours: Option<u32>,
}

/// Parameters for one post-operative phase, indexed by a half-open week
/// interval `[weeks_start, weeks_end)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostOpPhaseConfig {
    pub name: String,
    pub weeks_start: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks_end: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_patterns: Vec<MovementPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_muscle_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds_increase: Option<i32>,
}

impl PostOpPhaseConfig {
    pub fn contains(&self, weeks: u32) -> bool {
        weeks >= self.weeks_start && self.weeks_end.map_or(true, |end| weeks < end)
    }

    pub fn has_blocks(&self) -> bool {
        !self.blocked_patterns.is_empty() || !self.blocked_muscle_groups.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DysphoriaFilterType {
    Soft,
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DysphoriaConfig {
    pub trigger: DysphoriaTrigger,
    pub filter_type: DysphoriaFilterType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefer_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprioritize_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_tags: Vec<String>,
}

/// The complete, typed safety configuration the engine runs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    pub hrt_estrogen_phases: Vec<HrtPhaseConfig>,
    pub hrt_testosterone_phases: Vec<HrtPhaseConfig>,
    pub hrt_dual_phases: Vec<HrtPhaseConfig>,
    pub mtf_feminization: BodyDistribution,
    pub ftm_masculinization: BodyDistribution,
    pub binding: BTreeMap<BindingConfigKey, BindingConfig>,
    pub post_op: BTreeMap<SurgeryType, Vec<PostOpPhaseConfig>>,
    pub dysphoria: Vec<DysphoriaConfig>,
    /// Interval in minutes between in-session binder breaks.
    pub binder_break_minutes: u32,
}

impl SafetyConfig {
    pub fn hrt_phases(&self, hrt_type: HrtType) -> &[HrtPhaseConfig] {
        match hrt_type {
            HrtType::Estrogen => &self.hrt_estrogen_phases,
            HrtType::Testosterone => &self.hrt_testosterone_phases,
            HrtType::Both => &self.hrt_dual_phases,
            HrtType::None => &[],
        }
    }

    /// The unique phase whose `[min_months, max_months)` interval contains
    /// `months`.
    pub fn hrt_phase(&self, hrt_type: HrtType, months: u32) -> Option<&HrtPhaseConfig> {
        self.hrt_phases(hrt_type).iter().find(|p| p.contains(months))
    }

    pub fn binding(&self, key: BindingConfigKey) -> Option<&BindingConfig> {
        self.binding.get(&key)
    }

    pub fn post_op(&self, surgery: SurgeryType) -> &[PostOpPhaseConfig] {
        self.post_op.get(&surgery).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn post_op_phase(&self, surgery: SurgeryType, weeks: u32) -> Option<&PostOpPhaseConfig> {
        self.post_op(surgery).iter().find(|p| p.contains(weeks))
    }

    pub fn dysphoria(&self, trigger: DysphoriaTrigger) -> Option<&DysphoriaConfig> {
        self.dysphoria.iter().find(|d| d.trigger == trigger)
    }

    /// Hour threshold for the long-duration binding pack.
    pub fn long_binding_threshold_hours(&self) -> u32 {
        self.binding(BindingConfigKey::LongDuration)
            .and_then(|c| c.duration_threshold_hours)
            .unwrap_or(8)
    }

    /// Hour threshold for the overhead-pressing reduction.
    pub fn overhead_threshold_hours(&self) -> u32 {
        self.binding(BindingConfigKey::Overhead)
            .and_then(|c| c.duration_threshold_hours)
            .unwrap_or(6)
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        conservative_defaults()
    }
}

fn phase(
    name: &str,
    min_months: u32,
    max_months: Option<u32>,
) -> HrtPhaseConfig {
    HrtPhaseConfig {
        name: name.to_string(),
        min_months,
        max_months,
        ..Default::default()
    }
}

/// Built-in defaults used when the config store has never been reachable.
/// Deliberately conservative: these never relax a restriction relative to
/// shipped config rows.
pub fn conservative_defaults() -> SafetyConfig {
    let hrt_estrogen_phases = vec![
        HrtPhaseConfig {
            recovery_multiplier: Some(1.1),
            progressive_overload_rate: Some(0.05),
            ..phase("adjustment", 0, Some(3))
        },
        HrtPhaseConfig {
            recovery_multiplier: Some(1.2),
            volume_reduction_percent: Some(10.0),
            rest_seconds_increase: Some(30),
            progressive_overload_rate: Some(0.035),
            ..phase("transition", 3, Some(12))
        },
        HrtPhaseConfig {
            recovery_multiplier: Some(1.3),
            rest_seconds_increase: Some(30),
            progressive_overload_rate: Some(0.025),
            ..phase("established", 12, None)
        },
    ];
    let hrt_testosterone_phases = vec![
        HrtPhaseConfig {
            recovery_multiplier: Some(1.1),
            volume_reduction_percent: Some(10.0),
            progressive_overload_rate: Some(0.05),
            tendon_warning: true,
            ..phase("early", 0, Some(3))
        },
        HrtPhaseConfig {
            progressive_overload_rate: Some(0.075),
            rest_seconds_reduction: Some(15),
            tendon_warning: true,
            ..phase("building", 3, Some(12))
        },
        HrtPhaseConfig {
            progressive_overload_rate: Some(0.1),
            rest_seconds_reduction: Some(30),
            ..phase("established", 12, None)
        },
    ];
    let hrt_dual_phases = vec![
        HrtPhaseConfig {
            recovery_multiplier: Some(1.15),
            volume_reduction_percent: Some(10.0),
            progressive_overload_rate: Some(0.04),
            tendon_warning: true,
            ..phase("early", 0, Some(3))
        },
        HrtPhaseConfig {
            recovery_multiplier: Some(1.15),
            progressive_overload_rate: Some(0.05),
            ..phase("established", 3, None)
        },
    ];

    let mut binding = BTreeMap::new();
    binding.insert(
        BindingConfigKey::Commercial,
        BindingConfig {
            volume_reduction_percent: Some(10.0),
            rest_seconds_increase: Some(30),
            max_workout_minutes: Some(60),
            suggested_intensity: Some(Intensity::Moderate),
            ..Default::default()
        },
    );
    binding.insert(
        BindingConfigKey::AceBandage,
        BindingConfig {
            volume_reduction_percent: Some(40.0),
            rest_seconds_increase: Some(90),
            max_workout_minutes: Some(30),
            suggested_intensity: Some(Intensity::Light),
            max_sets: Some(2),
            ..Default::default()
        },
    );
    binding.insert(
        BindingConfigKey::Diy,
        BindingConfig {
            volume_reduction_percent: Some(40.0),
            rest_seconds_increase: Some(90),
            max_workout_minutes: Some(30),
            suggested_intensity: Some(Intensity::Light),
            max_sets: Some(2),
            ..Default::default()
        },
    );
    binding.insert(
        BindingConfigKey::LongDuration,
        BindingConfig {
            volume_reduction_percent: Some(25.0),
            rest_seconds_increase: Some(60),
            suggested_intensity: Some(Intensity::Moderate),
            duration_threshold_hours: Some(8),
            ..Default::default()
        },
    );
    binding.insert(
        BindingConfigKey::Overhead,
        BindingConfig {
            volume_reduction_percent: Some(30.0),
            duration_threshold_hours: Some(6),
            ..Default::default()
        },
    );

    let mut post_op = BTreeMap::new();
    post_op.insert(
        SurgeryType::TopSurgery,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(6),
                blocked_patterns: vec![MovementPattern::Push, MovementPattern::Pull],
                blocked_muscle_groups: vec![
                    "chest".to_string(),
                    "lats".to_string(),
                    "shoulders".to_string(),
                ],
                volume_reduction_percent: Some(50.0),
                max_sets: Some(2),
                rest_seconds_increase: Some(60),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 6,
                weeks_end: Some(12),
                volume_reduction_percent: Some(30.0),
                max_sets: Some(3),
                max_weight: Some("light".to_string()),
                rep_range: Some("12-15".to_string()),
                rest_seconds_increase: Some(30),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "return".to_string(),
                weeks_start: 12,
                weeks_end: Some(26),
                volume_reduction_percent: Some(10.0),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::BottomSurgery,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(12),
                blocked_patterns: vec![
                    MovementPattern::Squat,
                    MovementPattern::Hinge,
                    MovementPattern::Lunge,
                    MovementPattern::Cardio,
                ],
                blocked_muscle_groups: vec!["pelvic_floor".to_string(), "glutes".to_string()],
                volume_reduction_percent: Some(60.0),
                max_sets: Some(2),
                rest_seconds_increase: Some(90),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 12,
                weeks_end: Some(26),
                volume_reduction_percent: Some(25.0),
                max_sets: Some(3),
                rep_range: Some("12-15".to_string()),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Vaginoplasty,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(12),
                blocked_patterns: vec![
                    MovementPattern::Squat,
                    MovementPattern::Hinge,
                    MovementPattern::Lunge,
                    MovementPattern::Cardio,
                ],
                blocked_muscle_groups: vec!["pelvic_floor".to_string()],
                volume_reduction_percent: Some(60.0),
                max_sets: Some(2),
                rest_seconds_increase: Some(90),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 12,
                weeks_end: Some(26),
                volume_reduction_percent: Some(25.0),
                rep_range: Some("12-15".to_string()),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Phalloplasty,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(12),
                blocked_patterns: vec![
                    MovementPattern::Squat,
                    MovementPattern::Hinge,
                    MovementPattern::Carry,
                ],
                blocked_muscle_groups: vec!["forearms".to_string(), "quads".to_string()],
                volume_reduction_percent: Some(60.0),
                max_sets: Some(2),
                rest_seconds_increase: Some(90),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 12,
                weeks_end: Some(26),
                volume_reduction_percent: Some(30.0),
                max_sets: Some(3),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Metoidioplasty,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(8),
                blocked_patterns: vec![MovementPattern::Squat, MovementPattern::Hinge],
                blocked_muscle_groups: vec!["pelvic_floor".to_string()],
                volume_reduction_percent: Some(50.0),
                max_sets: Some(2),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 8,
                weeks_end: Some(16),
                volume_reduction_percent: Some(20.0),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Orchiectomy,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(4),
                blocked_patterns: vec![MovementPattern::Squat, MovementPattern::Hinge],
                volume_reduction_percent: Some(40.0),
                max_sets: Some(2),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "return".to_string(),
                weeks_start: 4,
                weeks_end: Some(10),
                volume_reduction_percent: Some(15.0),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Hysterectomy,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(8),
                blocked_patterns: vec![
                    MovementPattern::Core,
                    MovementPattern::Squat,
                    MovementPattern::Hinge,
                ],
                blocked_muscle_groups: vec!["core".to_string()],
                volume_reduction_percent: Some(50.0),
                max_sets: Some(2),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "rebuilding".to_string(),
                weeks_start: 8,
                weeks_end: Some(16),
                volume_reduction_percent: Some(20.0),
                rep_range: Some("12-15".to_string()),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::BreastAugmentation,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(8),
                blocked_patterns: vec![MovementPattern::Push],
                blocked_muscle_groups: vec!["chest".to_string(), "shoulders".to_string()],
                volume_reduction_percent: Some(40.0),
                max_sets: Some(2),
                rest_seconds_increase: Some(60),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "return".to_string(),
                weeks_start: 8,
                weeks_end: Some(16),
                volume_reduction_percent: Some(15.0),
                max_weight: Some("light".to_string()),
                ..Default::default()
            },
        ],
    );
    post_op.insert(
        SurgeryType::Ffs,
        vec![
            PostOpPhaseConfig {
                name: "acute".to_string(),
                weeks_start: 0,
                weeks_end: Some(6),
                blocked_patterns: vec![MovementPattern::Hinge, MovementPattern::Cardio],
                volume_reduction_percent: Some(40.0),
                max_sets: Some(2),
                ..Default::default()
            },
            PostOpPhaseConfig {
                name: "return".to_string(),
                weeks_start: 6,
                weeks_end: Some(12),
                volume_reduction_percent: Some(15.0),
                ..Default::default()
            },
        ],
    );

    let dysphoria = vec![
        DysphoriaConfig {
            trigger: DysphoriaTrigger::Mirrors,
            filter_type: DysphoriaFilterType::Exclude,
            prefer_tags: vec![],
            deprioritize_tags: vec![],
            exclude_tags: vec!["mirror_required".to_string()],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::LookingAtChest,
            filter_type: DysphoriaFilterType::Soft,
            prefer_tags: vec!["lower_body".to_string()],
            deprioritize_tags: vec!["chest_focus".to_string()],
            exclude_tags: vec![],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::BodyContact,
            filter_type: DysphoriaFilterType::Exclude,
            prefer_tags: vec![],
            deprioritize_tags: vec![],
            exclude_tags: vec!["partner_contact".to_string()],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::CrowdedSpaces,
            filter_type: DysphoriaFilterType::Soft,
            prefer_tags: vec!["home_friendly".to_string()],
            deprioritize_tags: vec!["crowded_gym".to_string()],
            exclude_tags: vec![],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::TightClothing,
            filter_type: DysphoriaFilterType::Soft,
            prefer_tags: vec!["loose_clothing_ok".to_string()],
            deprioritize_tags: vec!["tight_clothing".to_string()],
            exclude_tags: vec![],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::Photos,
            filter_type: DysphoriaFilterType::Soft,
            prefer_tags: vec![],
            deprioritize_tags: vec!["photos_likely".to_string()],
            exclude_tags: vec![],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::Swimming,
            filter_type: DysphoriaFilterType::Exclude,
            prefer_tags: vec![],
            deprioritize_tags: vec![],
            exclude_tags: vec!["swimwear".to_string()],
        },
        DysphoriaConfig {
            trigger: DysphoriaTrigger::FormFocused,
            filter_type: DysphoriaFilterType::Soft,
            prefer_tags: vec!["functional".to_string()],
            deprioritize_tags: vec!["form_focused".to_string()],
            exclude_tags: vec![],
        },
    ];

    SafetyConfig {
        hrt_estrogen_phases,
        hrt_testosterone_phases,
        hrt_dual_phases,
        mtf_feminization: BodyDistribution {
            lower_percent: 65.0,
            upper_percent: 35.0,
        },
        ftm_masculinization: BodyDistribution {
            lower_percent: 35.0,
            upper_percent: 65.0,
        },
        binding,
        post_op,
        dysphoria,
        binder_break_minutes: 90,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrt_phase_boundaries_are_half_open() {
        let config = conservative_defaults();
        // Exactly at a boundary, the phase whose interval starts there wins.
        let at_three = config.hrt_phase(HrtType::Testosterone, 3).unwrap();
        assert_eq!(at_three.name, "building");
        let below = config.hrt_phase(HrtType::Testosterone, 2).unwrap();
        assert_eq!(below.name, "early");
    }

    #[test]
    fn defaults_cover_every_surgery_type() {
        let config = conservative_defaults();
        for surgery in [
            SurgeryType::TopSurgery,
            SurgeryType::BottomSurgery,
            SurgeryType::Vaginoplasty,
            SurgeryType::Phalloplasty,
            SurgeryType::Metoidioplasty,
            SurgeryType::Orchiectomy,
            SurgeryType::Hysterectomy,
            SurgeryType::BreastAugmentation,
            SurgeryType::Ffs,
        ] {
            assert!(!config.post_op(surgery).is_empty(), "{:?} missing", surgery);
            // Week zero always lands in a phase.
            assert!(config.post_op_phase(surgery, 0).is_some());
        }
    }

    #[test]
    fn defaults_cover_every_dysphoria_trigger() {
        let config = conservative_defaults();
        for trigger in [
            DysphoriaTrigger::LookingAtChest,
            DysphoriaTrigger::Mirrors,
            DysphoriaTrigger::BodyContact,
            DysphoriaTrigger::CrowdedSpaces,
            DysphoriaTrigger::TightClothing,
            DysphoriaTrigger::Photos,
            DysphoriaTrigger::Swimming,
            DysphoriaTrigger::FormFocused,
        ] {
            assert!(config.dysphoria(trigger).is_some(), "{:?} missing", trigger);
        }
    }

    #[test]
    fn post_op_intervals_are_ordered_and_disjoint() {
        let config = conservative_defaults();
        for phases in config.post_op.values() {
            for pair in phases.windows(2) {
                let end = pair[0].weeks_end.expect("non-final phase must be bounded");
                assert!(end <= pair[1].weeks_start);
            }
        }
    }
}
