//! Most-restrictive-wins parameter merge.
//!
//! For any two parameter sets M1 and M2, `merge(M1, M2)` is at least as
//! restrictive as either input on every key. The fold is commutative and
//! associative, so rule ordering never changes the merged outcome.

use crate::models::safety::ParameterSet;

fn max_f64(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}

fn min_f64(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn max_i32(a: Option<i32>, b: Option<i32>) -> Option<i32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}

fn min_u32(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

impl ParameterSet {
    /// Fold `other` into `self`, keeping the more restrictive value on every
    /// key.
    pub fn merge_from(&mut self, other: &ParameterSet) {
        // Larger reductions and longer rests restrict more.
        self.volume_reduction_percent =
            max_f64(self.volume_reduction_percent, other.volume_reduction_percent);
        self.rest_seconds_increase =
            max_i32(self.rest_seconds_increase, other.rest_seconds_increase);
        self.rest_seconds_reduction =
            max_i32(self.rest_seconds_reduction, other.rest_seconds_reduction);
        self.recovery_multiplier = max_f64(self.recovery_multiplier, other.recovery_multiplier);

        // Smaller caps and slower progression restrict more.
        self.progressive_overload_rate = min_f64(
            self.progressive_overload_rate,
            other.progressive_overload_rate,
        );
        self.max_sets = min_u32(self.max_sets, other.max_sets);
        self.max_workout_minutes = min_u32(self.max_workout_minutes, other.max_workout_minutes);
        self.lower_body_volume_percent = min_f64(
            self.lower_body_volume_percent,
            other.lower_body_volume_percent,
        );
        self.upper_body_volume_percent = min_f64(
            self.upper_body_volume_percent,
            other.upper_body_volume_percent,
        );

        // Lower intensity restricts more.
        self.suggested_intensity = match (self.suggested_intensity, other.suggested_intensity) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (x, y) => x.or(y),
        };

        // Non-comparable categorical strings: first value wins.
        if self.max_weight.is_none() {
            self.max_weight = other.max_weight.clone();
        }
        if self.rep_range.is_none() {
            self.rep_range = other.rep_range.clone();
        }

        // Unknown numeric keys default to max.
        for (key, value) in &other.extra {
            let entry = self.extra.entry(key.clone()).or_insert(*value);
            if *value > *entry {
                *entry = *value;
            }
        }
    }
}

/// Merge two parameter sets into a new one.
pub fn merge(a: &ParameterSet, b: &ParameterSet) -> ParameterSet {
    let mut merged = a.clone();
    merged.merge_from(b);
    merged
}
