//! The typing session tracker.
//!
//! A [`Session`] owns the target characters, one [`CharState`] per character,
//! and the cursor. Keystrokes, backspaces and ticks are expected from a single
//! serial caller; notifications are queued and collected with
//! [`Session::drain_events`].

use chrono::{DateTime, Local, TimeDelta};
use std::time::Duration;
use tracing::{debug, info};

use crate::article::ArticleId;
use crate::countdown::Countdown;
use crate::stats::{count_states, LiveStats, Snapshot};
use crate::text::normalize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CharState {
    #[default]
    NotTyped,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum EndReason {
    #[strum(serialize = "text complete")]
    TextComplete,
    #[strum(serialize = "countdown expired")]
    CountdownExpired,
    #[strum(serialize = "manual")]
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Ended(EndReason),
}

/// A single visual change for the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharUpdate {
    pub index: usize,
    pub state: CharState,
    /// The target is whitespace, so an error has no glyph to recolor.
    pub blank: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started(DateTime<Local>),
    CharChanged(CharUpdate),
    Ended { reason: EndReason, snapshot: Snapshot },
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    article: ArticleId,
    chars: Vec<char>,
    states: Vec<CharState>,
    cursor: usize,
    phase: Phase,
    started_at: Option<DateTime<Local>>,
    ended_at: Option<DateTime<Local>>,
    backspace_count: u32,
    countdown: Countdown,
    /// Configuration received mid-session, applied by the next load.
    pending_countdown: Option<Countdown>,
    remaining_secs: u64,
    stats: LiveStats,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(countdown: Countdown) -> Self {
        let mut session = Self {
            countdown,
            ..Self::default()
        };
        session.reset_clock();
        session
    }

    /// Replaces the current text, discarding all progress.
    pub fn load(&mut self, text: &str) {
        if let Some(countdown) = self.pending_countdown.take() {
            self.countdown = countdown;
        }
        self.chars = normalize(text).chars().collect();
        self.states = vec![CharState::NotTyped; self.chars.len()];
        self.cursor = 0;
        self.phase = Phase::Idle;
        self.started_at = None;
        self.ended_at = None;
        self.backspace_count = 0;
        self.events.clear();
        self.reset_clock();

        debug!(
            article = %self.article,
            chars = self.chars.len(),
            countdown = self.countdown.is_active(),
            "session loaded"
        );
    }

    pub fn set_article(&mut self, article: ArticleId) {
        self.article = article;
    }

    /// Stores a new countdown configuration. An idle session picks it up
    /// immediately; a running or finished one keeps its clock until the next
    /// [`Session::load`].
    pub fn set_countdown(&mut self, countdown: Countdown) {
        if self.phase == Phase::Idle {
            self.countdown = countdown;
            self.pending_countdown = None;
            self.reset_clock();
        } else {
            self.pending_countdown = Some(countdown);
        }
        debug!(countdown = %countdown, enabled = countdown.enabled, "countdown configured");
    }

    fn reset_clock(&mut self) {
        self.remaining_secs = if self.countdown.is_active() {
            self.countdown.total_secs()
        } else {
            0
        };
        self.stats = LiveStats::compute(
            &self.states,
            Duration::ZERO,
            self.remaining(),
            self.backspace_count,
        );
    }

    pub fn record_keystroke(&mut self, c: char) -> bool {
        self.record_keystroke_at(c, Local::now())
    }

    /// Marks the character under the cursor and advances. Returns `false`
    /// when nothing was recorded.
    pub fn record_keystroke_at(&mut self, c: char, now: DateTime<Local>) -> bool {
        if self.expire_if_due(now) || self.is_ended() || self.cursor >= self.chars.len() {
            return false;
        }

        if self.phase == Phase::Idle {
            self.phase = Phase::Active;
            self.started_at = Some(now);
            self.events.push(SessionEvent::Started(now));
            info!(article = %self.article, chars = self.chars.len(), "session started");
        }

        let index = self.cursor;
        let expected = self.chars[index];
        let state = if c == expected {
            CharState::Correct
        } else {
            CharState::Incorrect
        };
        self.states[index] = state;
        self.events.push(SessionEvent::CharChanged(CharUpdate {
            index,
            state,
            blank: expected.is_whitespace(),
        }));

        self.cursor += 1;
        self.recompute(now);

        if self.cursor == self.chars.len() {
            self.terminate(EndReason::TextComplete, now);
        }

        true
    }

    pub fn record_backspace(&mut self) -> bool {
        self.record_backspace_at(Local::now())
    }

    /// Un-does the previous character. Returns `false` at the start of the
    /// text or once the session has ended.
    pub fn record_backspace_at(&mut self, now: DateTime<Local>) -> bool {
        if self.expire_if_due(now) || self.cursor == 0 || self.is_ended() {
            return false;
        }

        self.backspace_count += 1;
        let index = self.cursor - 1;
        self.states[index] = CharState::NotTyped;
        debug_assert!(
            self.states[self.cursor..]
                .iter()
                .all(|s| *s == CharState::NotTyped),
            "states ahead of the cursor must be untyped"
        );
        self.cursor = index;
        self.events.push(SessionEvent::CharChanged(CharUpdate {
            index,
            state: CharState::NotTyped,
            blank: self.chars[index].is_whitespace(),
        }));
        self.recompute(now);

        debug!(cursor = self.cursor, backspaces = self.backspace_count, "backspace");
        true
    }

    pub fn tick(&mut self) {
        self.tick_at(Local::now())
    }

    /// Refreshes statistics and enforces the countdown. Only an active
    /// session ticks.
    pub fn tick_at(&mut self, now: DateTime<Local>) {
        if self.phase != Phase::Active || self.expire_if_due(now) {
            return;
        }
        self.recompute(now);
    }

    pub fn end_manually(&mut self) -> bool {
        self.end_manually_at(Local::now())
    }

    pub fn end_manually_at(&mut self, now: DateTime<Local>) -> bool {
        if self.expire_if_due(now) {
            return true;
        }
        if self.is_ended() {
            return false;
        }
        self.terminate(EndReason::Manual, now);
        true
    }

    /// The instant a running countdown reaches zero.
    fn deadline(&self) -> Option<DateTime<Local>> {
        if !self.countdown.is_active() {
            return None;
        }
        let total = i64::try_from(self.countdown.total_secs()).ok()?;
        Some(self.started_at? + TimeDelta::seconds(total))
    }

    /// Ends an active session whose countdown ran out by `now`, stamping the
    /// end at the deadline itself.
    fn expire_if_due(&mut self, now: DateTime<Local>) -> bool {
        match self.deadline() {
            Some(deadline) if self.phase == Phase::Active && now >= deadline => {
                self.terminate(EndReason::CountdownExpired, deadline);
                true
            }
            _ => false,
        }
    }

    fn terminate(&mut self, reason: EndReason, now: DateTime<Local>) {
        if self.is_ended() {
            return;
        }

        self.ended_at = Some(now);
        self.recompute(now);
        self.phase = Phase::Ended(reason);

        let snapshot = self.snapshot_at(now);
        info!(
            article = %self.article,
            %reason,
            typed = snapshot.typed_chars,
            correct = snapshot.correct_chars,
            total = snapshot.total_chars,
            elapsed_secs = snapshot.elapsed.as_secs(),
            "session ended"
        );
        self.events.push(SessionEvent::Ended { reason, snapshot });
    }

    fn recompute(&mut self, now: DateTime<Local>) {
        let elapsed = self.elapsed_until(now);
        if self.countdown.is_active() {
            self.remaining_secs = self
                .countdown
                .total_secs()
                .saturating_sub(elapsed.as_secs());
        }
        self.stats = LiveStats::compute(
            &self.states,
            elapsed,
            self.remaining(),
            self.backspace_count,
        );
    }

    fn elapsed_until(&self, now: DateTime<Local>) -> Duration {
        let Some(start) = self.started_at else {
            return Duration::ZERO;
        };
        let mut end = self.ended_at.unwrap_or(now);
        if let Some(deadline) = self.deadline() {
            end = end.min(deadline);
        }
        (end - start).to_std().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Local::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Local>) -> Snapshot {
        let (typed, correct) = count_states(&self.states);
        Snapshot {
            article: self.article.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            elapsed: self.elapsed_until(now),
            typed_chars: typed,
            total_chars: self.chars.len(),
            correct_chars: correct,
            backspace_count: self.backspace_count,
            end_reason: self.end_reason(),
        }
    }

    /// Takes the queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn states(&self) -> &[CharState] {
        &self.states
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            Phase::Ended(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn article(&self) -> &ArticleId {
        &self.article
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    pub fn backspace_count(&self) -> u32 {
        self.backspace_count
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    fn remaining(&self) -> Option<Duration> {
        self.countdown
            .is_active()
            .then(|| Duration::from_secs(self.remaining_secs))
    }

    pub fn stats(&self) -> &LiveStats {
        &self.stats
    }

    /// Whether the character at `idx` is a mistyped blank that needs a
    /// background marker.
    pub fn is_blank_error(&self, idx: usize) -> bool {
        self.states.get(idx) == Some(&CharState::Incorrect)
            && self.chars.get(idx).is_some_and(|c| c.is_whitespace())
    }
}
