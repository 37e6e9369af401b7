use chrono::{DateTime, Local};
use std::time::Duration;

use crate::article::ArticleId;
use crate::session::{CharState, EndReason};

pub fn completion_rate(typed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        typed as f64 * 100.0 / total as f64
    }
}

pub fn accuracy_rate(correct: usize, typed: usize) -> f64 {
    if typed == 0 {
        0.0
    } else {
        correct as f64 * 100.0 / typed as f64
    }
}

/// Characters per minute, truncated.
pub fn speed(typed: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        0
    } else {
        (typed as f64 / minutes) as u32
    }
}

/// Counts `(typed, correct)` over a state slice.
pub fn count_states(states: &[CharState]) -> (usize, usize) {
    states.iter().fold((0, 0), |(typed, correct), s| match s {
        CharState::NotTyped => (typed, correct),
        CharState::Correct => (typed + 1, correct + 1),
        CharState::Incorrect => (typed + 1, correct),
    })
}

/// Statistics shown while a session runs; refreshed on every mutation and tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveStats {
    pub typed: usize,
    pub correct: usize,
    pub total: usize,
    pub completion_rate: f64,
    pub accuracy_rate: f64,
    pub elapsed: Duration,
    /// Present when a countdown drives the session.
    pub remaining: Option<Duration>,
    pub speed: u32,
    pub backspaces: u32,
}

impl LiveStats {
    pub fn compute(
        states: &[CharState],
        elapsed: Duration,
        remaining: Option<Duration>,
        backspaces: u32,
    ) -> Self {
        let (typed, correct) = count_states(states);
        let total = states.len();
        Self {
            typed,
            correct,
            total,
            completion_rate: completion_rate(typed, total),
            accuracy_rate: accuracy_rate(correct, typed),
            elapsed,
            remaining,
            speed: speed(typed, elapsed),
            backspaces,
        }
    }

    /// Countdown remaining when one is running, otherwise elapsed time.
    pub fn displayed_time(&self) -> Duration {
        self.remaining.unwrap_or(self.elapsed)
    }

    pub fn is_countdown(&self) -> bool {
        self.remaining.is_some()
    }
}

/// Immutable record of a session, reported when it ends and on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub article: ArticleId,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
    pub elapsed: Duration,
    pub typed_chars: usize,
    pub total_chars: usize,
    pub correct_chars: usize,
    pub backspace_count: u32,
    pub end_reason: Option<EndReason>,
}

impl Snapshot {
    pub fn completion_rate(&self) -> f64 {
        completion_rate(self.typed_chars, self.total_chars)
    }

    pub fn accuracy_rate(&self) -> f64 {
        accuracy_rate(self.correct_chars, self.typed_chars)
    }

    pub fn speed(&self) -> u32 {
        speed(self.typed_chars, self.elapsed)
    }

    pub fn has_ended(&self) -> bool {
        self.end_reason.is_some()
    }
}
