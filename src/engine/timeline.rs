//! Checkpoint timeline injection.
//!
//! Merges required checkpoints into a workout's exercise sequence according
//! to trigger semantics, producing a single ordered timeline stamped with
//! minute offsets.

use crate::models::exercise::MovementPattern;
use crate::models::plan::{ExercisePrescription, TimelineEntry};
use crate::models::safety::{Checkpoint, CheckpointTrigger};

/// Build the session timeline for a workout.
///
/// `patterns` carries the movement pattern per prescription, index-aligned
/// with `exercises`.
pub fn build_timeline(
    exercises: &[ExercisePrescription],
    patterns: &[MovementPattern],
    checkpoints: &[Checkpoint],
) -> Vec<TimelineEntry> {
    debug_assert_eq!(exercises.len(), patterns.len());

    let total_minutes: u32 = exercises.iter().map(|e| e.minutes).sum();
    let mut timeline: Vec<TimelineEntry> = Vec::new();

    for checkpoint in checkpoints {
        if checkpoint.trigger == CheckpointTrigger::WorkoutStart {
            timeline.push(TimelineEntry::Checkpoint {
                minute: 0,
                checkpoint: checkpoint.clone(),
            });
        }
    }

    let first_strength_minute = offset_of(exercises, patterns, |p| p.is_strength());
    let first_cardio_minute = offset_of(exercises, patterns, |p| *p == MovementPattern::Cardio);

    let mut minute = 0u32;
    for (prescription, pattern) in exercises.iter().zip(patterns) {
        for checkpoint in checkpoints {
            let due = match checkpoint.trigger {
                CheckpointTrigger::BeforeStrength => {
                    pattern.is_strength() && Some(minute) == first_strength_minute
                }
                CheckpointTrigger::BeforeCardio => {
                    *pattern == MovementPattern::Cardio && Some(minute) == first_cardio_minute
                }
                _ => false,
            };
            if due {
                timeline.push(TimelineEntry::Checkpoint {
                    minute,
                    checkpoint: checkpoint.clone(),
                });
            }
        }
        timeline.push(TimelineEntry::Exercise {
            minute,
            exercise_id: prescription.exercise_id,
            name: prescription.name.clone(),
        });
        minute += prescription.minutes;
    }

    // Recurring checkpoints land at each whole interval. Sessions shorter
    // than one interval omit them entirely.
    for checkpoint in checkpoints {
        if let CheckpointTrigger::EveryMinutes(interval) = checkpoint.trigger {
            if interval == 0 || total_minutes <= interval {
                continue;
            }
            let mut at = interval;
            while at < total_minutes {
                timeline.push(TimelineEntry::Checkpoint {
                    minute: at,
                    checkpoint: checkpoint.clone(),
                });
                at += interval;
            }
        }
    }

    for checkpoint in checkpoints {
        if checkpoint.trigger == CheckpointTrigger::CoolDown {
            timeline.push(TimelineEntry::Checkpoint {
                minute: total_minutes,
                checkpoint: checkpoint.clone(),
            });
        }
    }
    for checkpoint in checkpoints {
        if checkpoint.trigger == CheckpointTrigger::WorkoutCompletion {
            timeline.push(TimelineEntry::Checkpoint {
                minute: total_minutes,
                checkpoint: checkpoint.clone(),
            });
        }
    }

    // Stable by minute; insertion order breaks ties so start checkpoints
    // stay ahead of the first exercise and completion markers stay last.
    timeline.sort_by_key(|e| e.minute());
    timeline
}

fn offset_of(
    exercises: &[ExercisePrescription],
    patterns: &[MovementPattern],
    predicate: impl Fn(&MovementPattern) -> bool,
) -> Option<u32> {
    let mut minute = 0u32;
    for (prescription, pattern) in exercises.iter().zip(patterns) {
        if predicate(pattern) {
            return Some(minute);
        }
        minute += prescription.minutes;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exercise::Intensity;
    use crate::models::safety::{CheckpointKind, Severity};

    fn prescription(id: i32, minutes: u32) -> ExercisePrescription {
        ExercisePrescription {
            exercise_id: id,
            name: format!("exercise {}", id),
            sets: 3,
            reps: "8-12".to_string(),
            rest_seconds: 90,
            intensity: Intensity::Moderate,
            minutes,
            notes: None,
        }
    }

    fn checkpoint(trigger: CheckpointTrigger) -> Checkpoint {
        Checkpoint {
            kind: CheckpointKind::SafetyReminder,
            trigger,
            message: "check in".to_string(),
            severity: Severity::Moderate,
        }
    }

    #[test]
    fn workout_start_heads_the_timeline() {
        let exercises = vec![prescription(1, 10), prescription(2, 10)];
        let patterns = vec![MovementPattern::Push, MovementPattern::Core];
        let timeline = build_timeline(
            &exercises,
            &patterns,
            &[checkpoint(CheckpointTrigger::WorkoutStart)],
        );
        assert!(matches!(timeline[0], TimelineEntry::Checkpoint { minute: 0, .. }));
    }

    #[test]
    fn before_strength_lands_before_first_strength_exercise() {
        let exercises = vec![prescription(1, 8), prescription(2, 10), prescription(3, 10)];
        let patterns = vec![
            MovementPattern::Cardio,
            MovementPattern::Squat,
            MovementPattern::Push,
        ];
        let timeline = build_timeline(
            &exercises,
            &patterns,
            &[checkpoint(CheckpointTrigger::BeforeStrength)],
        );
        let checkpoint_pos = timeline
            .iter()
            .position(|e| matches!(e, TimelineEntry::Checkpoint { .. }))
            .unwrap();
        let squat_pos = timeline
            .iter()
            .position(|e| matches!(e, TimelineEntry::Exercise { exercise_id: 2, .. }))
            .unwrap();
        assert!(checkpoint_pos < squat_pos);
        assert_eq!(timeline[checkpoint_pos].minute(), 8);
    }

    #[test]
    fn recurring_checkpoint_omitted_for_short_sessions() {
        let exercises = vec![prescription(1, 20)];
        let patterns = vec![MovementPattern::Push];
        let timeline = build_timeline(
            &exercises,
            &patterns,
            &[checkpoint(CheckpointTrigger::EveryMinutes(90))],
        );
        assert!(timeline
            .iter()
            .all(|e| matches!(e, TimelineEntry::Exercise { .. })));
    }

    #[test]
    fn recurring_checkpoint_repeats_past_each_interval() {
        let exercises: Vec<ExercisePrescription> =
            (0..10).map(|i| prescription(i, 20)).collect();
        let patterns = vec![MovementPattern::Push; 10];
        let timeline = build_timeline(
            &exercises,
            &patterns,
            &[checkpoint(CheckpointTrigger::EveryMinutes(90))],
        );
        let breaks: Vec<u32> = timeline
            .iter()
            .filter(|e| matches!(e, TimelineEntry::Checkpoint { .. }))
            .map(TimelineEntry::minute)
            .collect();
        assert_eq!(breaks, vec![90, 180]);
    }

    #[test]
    fn completion_marker_is_terminal() {
        let exercises = vec![prescription(1, 15), prescription(2, 15)];
        let patterns = vec![MovementPattern::Push, MovementPattern::Pull];
        let timeline = build_timeline(
            &exercises,
            &patterns,
            &[
                checkpoint(CheckpointTrigger::CoolDown),
                checkpoint(CheckpointTrigger::WorkoutCompletion),
            ],
        );
        let last = timeline.last().unwrap();
        assert_eq!(last.minute(), 30);
    }
}
