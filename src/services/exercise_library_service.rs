//! Read-only exercise catalog.
//!
//! The library is immutable once loaded and shared across requests. A
//! built-in seed catalog ships with the binary; a deployment can replace it
//! with rows from its own store at startup.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::exercise::{Exercise, Intensity, MovementPattern, RecoveryPhase};
use crate::models::profile::{ExperienceLevel, PrimaryGoal};

#[derive(Clone)]
pub struct ExerciseLibraryService {
    exercises: Arc<Vec<Exercise>>,
}

impl ExerciseLibraryService {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises: Arc::new(exercises),
        }
    }

    pub fn builtin() -> Self {
        Self::new(seed_catalog())
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: i32) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn goals(values: &[PrimaryGoal]) -> BTreeSet<PrimaryGoal> {
    values.iter().copied().collect()
}

/// Baseline entry: bodyweight, beginner, moderate effort, no safety
/// clearances. Entries opt in to clearances explicitly.
fn exercise(
    id: i32,
    name: &str,
    pattern: MovementPattern,
    muscles: &[&str],
    equipment: &[&str],
    effectiveness_rating: f64,
) -> Exercise {
    Exercise {
        id,
        name: name.to_string(),
        pattern,
        target_muscles: tags(muscles),
        equipment: tags(equipment),
        difficulty: ExperienceLevel::Beginner,
        intensity: Intensity::Moderate,
        plyometric: false,
        binder_aware: false,
        heavy_binding_safe: false,
        pelvic_floor_safe: false,
        contraindications: BTreeSet::new(),
        dysphoria_tags: BTreeSet::new(),
        earliest_safe_phase: None,
        effectiveness_rating,
        gender_goal_emphasis: BTreeSet::new(),
    }
}

/// The built-in catalog. Ids are stable; scoring ties break on them.
pub fn seed_catalog() -> Vec<Exercise> {
    use ExperienceLevel::*;
    use Intensity::*;
    use MovementPattern::*;
    use PrimaryGoal::*;
    use RecoveryPhase as Phase;

    vec![
        // Push
        Exercise {
            binder_aware: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["chest_focus", "home_friendly"]),
            gender_goal_emphasis: goals(&[Masculinization]),
            ..exercise(1, "Push-up", Push, &["chest", "shoulders", "triceps"], &["none"], 0.78)
        },
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["chest_focus", "crowded_gym"]),
            gender_goal_emphasis: goals(&[Masculinization, Strength]),
            ..exercise(2, "Barbell Bench Press", Push, &["chest", "triceps"], &["barbell", "bench"], 0.9)
        },
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            contraindications: tags(&["overhead"]),
            earliest_safe_phase: Some(Phase::Late),
            gender_goal_emphasis: goals(&[Masculinization, Strength]),
            ..exercise(3, "Standing Overhead Press", Push, &["shoulders", "triceps"], &["barbell"], 0.85)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["chest_focus"]),
            gender_goal_emphasis: goals(&[Masculinization]),
            ..exercise(4, "Incline Dumbbell Press", Push, &["chest", "shoulders"], &["dumbbells", "bench"], 0.82)
        },
        Exercise {
            binder_aware: true,
            contraindications: tags(&["overhead"]),
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(5, "Seated Dumbbell Shoulder Press", Push, &["shoulders", "triceps"], &["dumbbells", "bench"], 0.75)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(6, "Wall Push-up", Push, &["chest", "shoulders"], &["none"], 0.45)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Late),
            gender_goal_emphasis: goals(&[Masculinization]),
            ..exercise(7, "Landmine Press", Push, &["shoulders", "chest"], &["barbell"], 0.7)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["mirror_required"]),
            gender_goal_emphasis: goals(&[Aesthetics]),
            ..exercise(8, "Dumbbell Lateral Raise", Push, &["shoulders"], &["dumbbells"], 0.6)
        },
        // Pull
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Late),
            gender_goal_emphasis: goals(&[Masculinization, Strength]),
            ..exercise(9, "Bent-over Barbell Row", Pull, &["lats", "upper_back", "biceps"], &["barbell"], 0.88)
        },
        Exercise {
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(10, "One-arm Dumbbell Row", Pull, &["lats", "biceps"], &["dumbbells", "bench"], 0.8)
        },
        Exercise {
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["crowded_gym"]),
            gender_goal_emphasis: goals(&[Masculinization]),
            ..exercise(11, "Lat Pulldown", Pull, &["lats", "biceps"], &["machine"], 0.82)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(12, "Band Pull-apart", Pull, &["upper_back", "shoulders"], &["bands"], 0.55)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(13, "Band Face Pull", Pull, &["upper_back", "shoulders"], &["bands"], 0.65)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(14, "Inverted Row", Pull, &["lats", "upper_back"], &["barbell"], 0.75)
        },
        // Squat
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["form_focused", "home_friendly"]),
            ..exercise(15, "Bodyweight Squat", Squat, &["quads", "glutes"], &["none"], 0.6)
        },
        Exercise {
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["form_focused"]),
            gender_goal_emphasis: goals(&[GeneralFitness, Strength]),
            ..exercise(16, "Goblet Squat", Squat, &["quads", "glutes", "core"], &["kettlebell"], 0.85)
        },
        Exercise {
            difficulty: Advanced,
            intensity: High,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["mirror_required", "form_focused"]),
            gender_goal_emphasis: goals(&[Strength, Masculinization]),
            ..exercise(17, "Barbell Back Squat", Squat, &["quads", "glutes", "lower_back"], &["barbell"], 0.92)
        },
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["crowded_gym"]),
            gender_goal_emphasis: goals(&[Feminization, Aesthetics]),
            ..exercise(18, "Leg Press", Squat, &["quads", "glutes"], &["machine"], 0.8)
        },
        // Hinge
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["form_focused"]),
            gender_goal_emphasis: goals(&[Strength, Feminization]),
            ..exercise(19, "Romanian Deadlift", Hinge, &["hamstrings", "glutes", "lower_back"], &["barbell"], 0.9)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly", "lower_body"]),
            gender_goal_emphasis: goals(&[Feminization, Aesthetics]),
            ..exercise(20, "Glute Bridge", Hinge, &["glutes", "hamstrings"], &["none"], 0.7)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["lower_body"]),
            gender_goal_emphasis: goals(&[Feminization, Aesthetics]),
            ..exercise(21, "Barbell Hip Thrust", Hinge, &["glutes"], &["barbell", "bench"], 0.88)
        },
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            plyometric: true,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Maintenance),
            gender_goal_emphasis: goals(&[GeneralFitness]),
            ..exercise(22, "Kettlebell Swing", Hinge, &["glutes", "hamstrings"], &["kettlebell"], 0.8)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(23, "Back Extension", Hinge, &["lower_back", "glutes"], &["machine"], 0.6)
        },
        // Lunge
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["form_focused", "home_friendly", "lower_body"]),
            gender_goal_emphasis: goals(&[Feminization]),
            ..exercise(24, "Split Squat", Lunge, &["quads", "glutes"], &["none"], 0.75)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["crowded_gym", "lower_body"]),
            gender_goal_emphasis: goals(&[Feminization, Aesthetics]),
            ..exercise(25, "Walking Lunge", Lunge, &["quads", "glutes"], &["dumbbells"], 0.8)
        },
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["home_friendly", "lower_body"]),
            gender_goal_emphasis: goals(&[Feminization]),
            ..exercise(26, "Step-up", Lunge, &["quads", "glutes"], &["bench"], 0.72)
        },
        // Carry
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            contraindications: tags(&["donor_site_stress"]),
            earliest_safe_phase: Some(Phase::Mid),
            gender_goal_emphasis: goals(&[Masculinization, GeneralFitness]),
            ..exercise(27, "Farmer Carry", Carry, &["forearms", "core", "upper_back"], &["kettlebell"], 0.78)
        },
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            contraindications: tags(&["donor_site_stress"]),
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(28, "Suitcase Carry", Carry, &["core", "forearms"], &["kettlebell"], 0.74)
        },
        // Core
        Exercise {
            binder_aware: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["form_focused", "home_friendly"]),
            ..exercise(29, "Plank", Core, &["core", "shoulders"], &["none"], 0.7)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(30, "Dead Bug", Core, &["core"], &["none"], 0.65)
        },
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(31, "Bird Dog", Core, &["core", "lower_back"], &["none"], 0.6)
        },
        Exercise {
            difficulty: Intermediate,
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            ..exercise(32, "Pallof Press", Core, &["core"], &["bands"], 0.75)
        },
        Exercise {
            difficulty: Advanced,
            intensity: High,
            contraindications: tags(&["donor_site_stress"]),
            earliest_safe_phase: Some(Phase::Maintenance),
            dysphoria_tags: tags(&["crowded_gym"]),
            ..exercise(33, "Hanging Knee Raise", Core, &["core", "forearms"], &["pullup_bar"], 0.7)
        },
        // Cardio
        Exercise {
            intensity: Light,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Immediate),
            dysphoria_tags: tags(&["home_friendly", "loose_clothing_ok"]),
            ..exercise(34, "Brisk Walking", Cardio, &["quads", "calves"], &["none"], 0.55)
        },
        Exercise {
            binder_aware: true,
            heavy_binding_safe: true,
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["crowded_gym", "lower_body"]),
            gender_goal_emphasis: goals(&[Feminization]),
            ..exercise(35, "Stationary Cycling", Cardio, &["quads", "calves"], &["machine"], 0.7)
        },
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["crowded_gym"]),
            gender_goal_emphasis: goals(&[GeneralFitness]),
            ..exercise(36, "Rowing Machine", Cardio, &["upper_back", "quads"], &["machine"], 0.8)
        },
        Exercise {
            difficulty: Advanced,
            intensity: VeryHigh,
            plyometric: true,
            earliest_safe_phase: Some(Phase::Maintenance),
            dysphoria_tags: tags(&["form_focused"]),
            gender_goal_emphasis: goals(&[GeneralFitness]),
            ..exercise(37, "HIIT Intervals", Cardio, &["quads", "calves"], &["none"], 0.85)
        },
        Exercise {
            difficulty: Intermediate,
            earliest_safe_phase: Some(Phase::Late),
            dysphoria_tags: tags(&["swimwear", "body_focus"]),
            ..exercise(38, "Lap Swimming", Cardio, &["upper_back", "shoulders"], &["pool"], 0.8)
        },
        Exercise {
            difficulty: Intermediate,
            intensity: High,
            plyometric: true,
            earliest_safe_phase: Some(Phase::Maintenance),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(39, "Jump Rope", Cardio, &["calves", "quads"], &["jump_rope"], 0.75)
        },
        // Mobility
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Immediate),
            dysphoria_tags: tags(&["home_friendly", "loose_clothing_ok"]),
            ..exercise(40, "Cat-Cow", Mobility, &["lower_back", "core"], &["none"], 0.5)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly", "loose_clothing_ok"]),
            ..exercise(41, "Hip Flexor Mobility", Mobility, &["hip_flexors", "quads"], &["none"], 0.55)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Immediate),
            dysphoria_tags: tags(&["home_friendly", "loose_clothing_ok"]),
            ..exercise(42, "Shoulder Circles", Mobility, &["shoulders"], &["none"], 0.45)
        },
        // Stretch
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            contraindications: tags(&["chest_stretch"]),
            earliest_safe_phase: Some(Phase::Mid),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(43, "Doorway Chest Stretch", Stretch, &["chest", "shoulders"], &["none"], 0.5)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(44, "Seated Hamstring Stretch", Stretch, &["hamstrings"], &["none"], 0.5)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            contraindications: tags(&["forward_bend"]),
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly", "loose_clothing_ok"]),
            ..exercise(45, "Child's Pose", Stretch, &["lower_back"], &["none"], 0.45)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            earliest_safe_phase: Some(Phase::Early),
            dysphoria_tags: tags(&["home_friendly"]),
            ..exercise(46, "Standing Quad Stretch", Stretch, &["quads"], &["none"], 0.5)
        },
        Exercise {
            intensity: VeryLight,
            binder_aware: true,
            heavy_binding_safe: true,
            pelvic_floor_safe: true,
            dysphoria_tags: tags(&["partner_contact"]),
            earliest_safe_phase: Some(Phase::Late),
            ..exercise(47, "Partner-Assisted Stretch", Stretch, &["hamstrings", "lower_back"], &["none"], 0.55)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique_and_stable() {
        let catalog = seed_catalog();
        let mut ids: Vec<i32> = catalog.iter().map(|e| e.id).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn every_pattern_is_represented() {
        let catalog = seed_catalog();
        for pattern in [
            MovementPattern::Push,
            MovementPattern::Pull,
            MovementPattern::Squat,
            MovementPattern::Hinge,
            MovementPattern::Lunge,
            MovementPattern::Carry,
            MovementPattern::Core,
            MovementPattern::Cardio,
            MovementPattern::Mobility,
            MovementPattern::Stretch,
        ] {
            assert!(
                catalog.iter().any(|e| e.pattern == pattern),
                "no exercise for {:?}",
                pattern
            );
        }
    }

    #[test]
    fn effectiveness_ratings_stay_in_unit_range() {
        for exercise in seed_catalog() {
            assert!((0.0..=1.0).contains(&exercise.effectiveness_rating), "{}", exercise.name);
        }
    }

    #[test]
    fn bodyweight_recovery_work_exists_for_every_phase() {
        // Post-op users always have something admissible.
        let catalog = seed_catalog();
        assert!(catalog
            .iter()
            .any(|e| e.earliest_safe_phase == Some(RecoveryPhase::Immediate)));
    }
}
