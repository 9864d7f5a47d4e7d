//! Property tests for the most-restrictive-wins merge algebra: for any two
//! parameter sets, the merge is at least as restrictive as either input on
//! every key, and commutative on the comparable keys.

use proptest::prelude::*;

use affirmfit::engine::merge;
use affirmfit::models::{Intensity, ParameterSet};

fn intensity_strategy() -> impl Strategy<Value = Option<Intensity>> {
    prop_oneof![
        Just(None),
        Just(Some(Intensity::VeryLight)),
        Just(Some(Intensity::Light)),
        Just(Some(Intensity::Moderate)),
        Just(Some(Intensity::High)),
        Just(Some(Intensity::VeryHigh)),
    ]
}

prop_compose! {
    fn parameter_set()(
        volume in proptest::option::of(0.0f64..=100.0),
        rest_inc in proptest::option::of(0i32..=300),
        rest_red in proptest::option::of(0i32..=120),
        recovery in proptest::option::of(1.0f64..=2.0),
        overload in proptest::option::of(0.0f64..=0.2),
        max_sets in proptest::option::of(1u32..=6),
        max_minutes in proptest::option::of(15u32..=120),
        lower in proptest::option::of(0.0f64..=100.0),
        upper in proptest::option::of(0.0f64..=100.0),
        intensity in intensity_strategy(),
    ) -> ParameterSet {
        ParameterSet {
            volume_reduction_percent: volume,
            rest_seconds_increase: rest_inc,
            rest_seconds_reduction: rest_red,
            recovery_multiplier: recovery,
            progressive_overload_rate: overload,
            max_sets,
            max_workout_minutes: max_minutes,
            lower_body_volume_percent: lower,
            upper_body_volume_percent: upper,
            suggested_intensity: intensity,
            max_weight: None,
            rep_range: None,
            extra: Default::default(),
        }
    }
}

fn at_least_as_restrictive(merged: &ParameterSet, input: &ParameterSet) -> bool {
    fn ge_max<T: PartialOrd + Copy>(merged: Option<T>, input: Option<T>) -> bool {
        match (merged, input) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(m), Some(i)) => m >= i,
        }
    }
    fn le_min<T: PartialOrd + Copy>(merged: Option<T>, input: Option<T>) -> bool {
        match (merged, input) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(m), Some(i)) => m <= i,
        }
    }

    ge_max(merged.volume_reduction_percent, input.volume_reduction_percent)
        && ge_max(merged.rest_seconds_increase, input.rest_seconds_increase)
        && ge_max(merged.rest_seconds_reduction, input.rest_seconds_reduction)
        && ge_max(merged.recovery_multiplier, input.recovery_multiplier)
        && le_min(merged.progressive_overload_rate, input.progressive_overload_rate)
        && le_min(merged.max_sets, input.max_sets)
        && le_min(merged.max_workout_minutes, input.max_workout_minutes)
        && le_min(merged.lower_body_volume_percent, input.lower_body_volume_percent)
        && le_min(merged.upper_body_volume_percent, input.upper_body_volume_percent)
        && le_min(merged.suggested_intensity, input.suggested_intensity)
}

proptest! {
    #[test]
    fn merge_is_monotone_in_restrictiveness(a in parameter_set(), b in parameter_set()) {
        let merged = merge(&a, &b);
        prop_assert!(at_least_as_restrictive(&merged, &a));
        prop_assert!(at_least_as_restrictive(&merged, &b));
    }

    #[test]
    fn merge_is_commutative(a in parameter_set(), b in parameter_set()) {
        // Categorical first-wins keys are left out of the generated sets,
        // so the full merge must commute.
        prop_assert_eq!(merge(&a, &b), merge(&b, &a));
    }

    #[test]
    fn merge_is_associative(
        a in parameter_set(),
        b in parameter_set(),
        c in parameter_set(),
    ) {
        prop_assert_eq!(merge(&merge(&a, &b), &c), merge(&a, &merge(&b, &c)));
    }

    #[test]
    fn merge_with_empty_is_identity(a in parameter_set()) {
        prop_assert_eq!(merge(&a, &ParameterSet::default()), a.clone());
        prop_assert_eq!(merge(&ParameterSet::default(), &a), a);
    }
}
