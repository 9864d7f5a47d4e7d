//! In-session binder-break timer.
//!
//! A small state machine owned by the session runtime, independent of plan
//! generation. Cancelling the timer never touches plan state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TimerState {
    Idle,
    Running { remaining_seconds: u32 },
    Completed,
    Cancelled,
}

/// Advisory surfaced to the session UI on a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAdvisory {
    /// Entering `Running` pauses the session clock.
    WorkoutPaused,
    /// Leaving `Running` resumes the session clock.
    WorkoutResumed,
}

#[derive(Debug, Clone)]
pub struct BinderBreakTimer {
    duration_seconds: u32,
    state: TimerState,
}

impl BinderBreakTimer {
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TimerState::Completed | TimerState::Cancelled)
    }

    /// Start the break. No-op unless idle.
    pub fn start(&mut self) -> Option<TimerAdvisory> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running {
                    remaining_seconds: self.duration_seconds,
                };
                Some(TimerAdvisory::WorkoutPaused)
            }
            _ => None,
        }
    }

    /// Advance the clock. Completes automatically on reaching zero.
    pub fn tick(&mut self, elapsed_seconds: u32) -> Option<TimerAdvisory> {
        match self.state {
            TimerState::Running { remaining_seconds } => {
                if elapsed_seconds >= remaining_seconds {
                    self.state = TimerState::Completed;
                    Some(TimerAdvisory::WorkoutResumed)
                } else {
                    self.state = TimerState::Running {
                        remaining_seconds: remaining_seconds - elapsed_seconds,
                    };
                    None
                }
            }
            _ => None,
        }
    }

    /// User-initiated cancel. Resumes the session if the break was running.
    pub fn cancel(&mut self) -> Option<TimerAdvisory> {
        match self.state {
            TimerState::Running { .. } => {
                self.state = TimerState::Cancelled;
                Some(TimerAdvisory::WorkoutResumed)
            }
            TimerState::Idle => {
                self.state = TimerState::Cancelled;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn completes_when_ticked_to_zero() {
        let mut timer = BinderBreakTimer::new(60);
        assert_eq!(timer.start(), Some(TimerAdvisory::WorkoutPaused));
        assert_eq!(timer.tick(30), None);
        assert_matches!(timer.state(), TimerState::Running { remaining_seconds: 30 });
        assert_eq!(timer.tick(30), Some(TimerAdvisory::WorkoutResumed));
        assert_eq!(timer.state(), TimerState::Completed);
        assert!(timer.is_terminal());
    }

    #[test]
    fn cancel_resumes_the_session() {
        let mut timer = BinderBreakTimer::new(60);
        timer.start();
        assert_eq!(timer.cancel(), Some(TimerAdvisory::WorkoutResumed));
        assert_eq!(timer.state(), TimerState::Cancelled);
        // Terminal states ignore further events.
        assert_eq!(timer.start(), None);
        assert_eq!(timer.tick(10), None);
    }

    #[test]
    fn tick_before_start_is_ignored() {
        let mut timer = BinderBreakTimer::new(60);
        assert_eq!(timer.tick(10), None);
        assert_eq!(timer.state(), TimerState::Idle);
    }
}
