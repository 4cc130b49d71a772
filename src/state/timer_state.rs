//! Single countdown timer and its state machine
//!
//! Remaining time is never decremented. While running, it is recomputed from a
//! monotonic anchor captured at start, so missed ticks, sleep and wall-clock
//! changes all correct themselves on the next tick.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{clock::Clock, utils::format};

/// Minute presets offered for one-click configuration
pub const PRESET_MINUTES: [u64; 4] = [5, 10, 25, 50];

/// Lifecycle of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
    Completed,
}

impl TimerState {
    pub fn is_active(self) -> bool {
        self == TimerState::Running
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Read-only view of a timer handed to presentation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub id: Uuid,
    pub title: String,
    pub state: TimerState,
    pub total_seconds: f64,
    pub remaining_seconds: f64,
    pub formatted: String,
    pub compact: String,
    pub progress: f64,
    pub pending_seconds: Option<f64>,
}

/// One countdown timer
#[derive(Debug)]
pub struct Timer {
    id: Uuid,
    title: String,
    state: TimerState,
    total: Duration,
    remaining: Duration,
    start_reference: Duration,
    completion_handled: bool,
    pending: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Timer {
    /// Create a stopped timer with nothing configured
    pub fn new(title: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            state: TimerState::Stopped,
            total: Duration::ZERO,
            remaining: Duration::ZERO,
            start_reference: Duration::ZERO,
            completion_handled: false,
            pending: None,
            clock,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rename the timer; surrounding whitespace is trimmed and a blank title
    /// is ignored
    pub fn set_title(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            debug!("Ignoring blank title for timer {}", self.id);
            return false;
        }
        self.title = title.to_string();
        true
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Duration that the next fresh start will use, if one is configured
    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// Store a pending duration built from whole hours, minutes and seconds
    ///
    /// Returns whether the configuration was accepted. An all-zero or
    /// overflowing configuration leaves the timer untouched.
    pub fn configure(&mut self, hours: u64, minutes: u64, seconds: u64) -> bool {
        match whole_duration(hours, minutes, seconds) {
            Some(total) => {
                self.pending = Some(total);
                true
            }
            None => {
                debug!(
                    "Ignoring configuration {}h {}m {}s for timer {}",
                    hours, minutes, seconds, self.id
                );
                false
            }
        }
    }

    /// Store a pending duration from the raw text of the three input fields
    ///
    /// Each field may hold a decimal number. Empty, unparsable or negative
    /// fields count as zero, and the sum must still be positive.
    pub fn configure_input(&mut self, hours: &str, minutes: &str, seconds: &str) -> bool {
        let secs =
            parse_field(hours) * 3600.0 + parse_field(minutes) * 60.0 + parse_field(seconds);

        match Duration::try_from_secs_f64(secs) {
            Ok(total) if !total.is_zero() => {
                self.pending = Some(total);
                true
            }
            _ => {
                debug!(
                    "Ignoring input {:?}/{:?}/{:?} for timer {}",
                    hours, minutes, seconds, self.id
                );
                false
            }
        }
    }

    /// Reset and configure a minute preset
    ///
    /// An invalid preset is ignored without resetting the timer.
    pub fn set_preset(&mut self, minutes: u64) -> bool {
        let Some(total) = whole_duration(0, minutes, 0) else {
            debug!("Ignoring {} minute preset for timer {}", minutes, self.id);
            return false;
        };
        self.reset();
        self.pending = Some(total);
        true
    }

    /// Start fresh from stopped, or resume from paused
    ///
    /// Returns whether the timer is now running because of this call.
    pub fn start(&mut self) -> bool {
        let now = self.clock.now();

        match self.state {
            TimerState::Running | TimerState::Completed => return false,
            TimerState::Stopped => {
                let Some(total) = self.pending else {
                    debug!("Timer {} has no valid configuration, not starting", self.id);
                    return false;
                };
                self.total = total;
                self.remaining = total;
                self.completion_handled = false;
                self.start_reference = now;
            }
            TimerState::Paused => {
                let elapsed = self.total.saturating_sub(self.remaining);
                self.start_reference = now.saturating_sub(elapsed);
            }
        }

        self.state = TimerState::Running;
        true
    }

    /// Freeze the countdown at its last computed value
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    /// Return to stopped with everything cleared
    pub fn reset(&mut self) {
        self.state = TimerState::Stopped;
        self.total = Duration::ZERO;
        self.remaining = Duration::ZERO;
        self.pending = None;
        self.completion_handled = false;
    }

    /// Start, pause or reset depending on the current state
    pub fn toggle(&mut self) {
        match self.state {
            TimerState::Stopped | TimerState::Paused => {
                self.start();
            }
            TimerState::Running => {
                self.pause();
            }
            TimerState::Completed => self.reset(),
        }
    }

    /// Recompute remaining time from the monotonic anchor
    ///
    /// Returns `true` only on the tick that completes the timer; the caller
    /// owns the completion side effects.
    #[must_use]
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        let elapsed = self.clock.now().saturating_sub(self.start_reference);
        self.remaining = self.total.saturating_sub(elapsed);

        if self.remaining.is_zero() && !self.completion_handled {
            self.completion_handled = true;
            self.state = TimerState::Completed;
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            id: self.id,
            title: self.title.clone(),
            state: self.state,
            total_seconds: self.total.as_secs_f64(),
            remaining_seconds: self.remaining.as_secs_f64(),
            formatted: format::formatted_time(self.remaining),
            compact: format::compact_time(self.remaining),
            progress: format::progress(self.total, self.remaining),
            pending_seconds: self.pending.map(|p| p.as_secs_f64()),
        }
    }
}

/// Positive duration from whole units, `None` when zero or overflowing
fn whole_duration(hours: u64, minutes: u64, seconds: u64) -> Option<Duration> {
    let secs = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_field(field: &str) -> f64 {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn timer() -> (Timer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (Timer::new("Timer", clock.clone()), clock)
    }

    #[test]
    fn new_timer_is_stopped_and_empty() {
        let (t, _) = timer();
        assert_eq!(t.state(), TimerState::Stopped);
        assert_eq!(t.total(), Duration::ZERO);
        assert_eq!(t.remaining(), Duration::ZERO);
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn configure_then_start_commits_total() {
        for (h, m, s) in [(1, 30, 45), (0, 25, 0), (0, 0, 90), (2, 0, 1)] {
            let (mut t, _) = timer();
            assert!(t.configure(h, m, s));
            assert!(t.start());
            assert_eq!(t.state(), TimerState::Running);
            assert_eq!(t.total(), Duration::from_secs(h * 3600 + m * 60 + s));
            assert_eq!(t.remaining(), t.total());
        }
    }

    #[test]
    fn zero_configuration_is_ignored() {
        let (mut t, _) = timer();
        assert!(!t.configure(0, 0, 0));
        assert!(!t.start());
        assert_eq!(t.state(), TimerState::Stopped);
    }

    #[test]
    fn zero_configuration_keeps_previous_pending() {
        let (mut t, _) = timer();
        t.configure(0, 1, 0);
        t.configure(0, 0, 0);
        assert_eq!(t.pending(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn overflowing_configuration_is_ignored() {
        let (mut t, _) = timer();
        assert!(!t.configure(u64::MAX, 0, 0));
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn text_input_parses_like_form_fields() {
        let (mut t, _) = timer();
        assert!(t.configure_input("", "1.5", "30"));
        assert_eq!(t.pending(), Some(Duration::from_secs(120)));

        let (mut t, _) = timer();
        assert!(!t.configure_input("abc", "", " "));
        assert!(!t.configure_input("-1", "0", "0"));
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn start_twice_is_same_as_once() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 90);
        assert!(t.start());
        clock.advance_secs(10);
        assert!(!t.start());
        assert!(!t.tick());
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining(), Duration::from_secs(80));
    }

    #[test]
    fn ninety_seconds_after_thirty_leaves_sixty() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 90);
        t.start();
        clock.advance_secs(30);
        assert!(!t.tick());
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining(), Duration::from_secs(60));
    }

    #[test]
    fn five_minutes_complete_after_three_hundred_seconds() {
        let (mut t, clock) = timer();
        t.configure(0, 5, 0);
        t.start();
        clock.advance_secs(300);
        assert!(t.tick());
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.remaining(), Duration::ZERO);
    }

    #[test]
    fn large_jump_completes_exactly_once() {
        let (mut t, clock) = timer();
        t.configure(0, 1, 0);
        t.start();
        clock.advance_secs(8 * 3600);
        assert!(t.tick());
        assert!(!t.tick());
        clock.advance_secs(10);
        assert!(!t.tick());
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.remaining(), Duration::ZERO);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 90);
        t.start();
        clock.advance_secs(20);
        assert!(!t.tick());
        assert!(t.pause());
        let frozen = t.remaining();
        assert_eq!(frozen, Duration::from_secs(70));

        clock.advance_secs(600);
        assert!(!t.tick());
        assert_eq!(t.remaining(), frozen);

        assert!(t.start());
        assert!(!t.tick());
        assert_eq!(t.remaining(), frozen);

        clock.advance(Duration::from_millis(100));
        assert!(!t.tick());
        assert!(frozen - t.remaining() <= Duration::from_millis(100));
    }

    #[test]
    fn pause_is_noop_unless_running() {
        let (mut t, _) = timer();
        assert!(!t.pause());
        assert_eq!(t.state(), TimerState::Stopped);
    }

    #[test]
    fn reset_clears_from_every_state() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 10);

        t.reset();
        assert_eq!(t.pending(), None);

        for advance in [0, 3, 20] {
            t.configure(0, 0, 10);
            t.start();
            clock.advance_secs(advance);
            let _ = t.tick();
            if advance == 3 {
                t.pause();
            }
            t.reset();
            assert_eq!(t.state(), TimerState::Stopped);
            assert_eq!(t.total(), Duration::ZERO);
            assert_eq!(t.remaining(), Duration::ZERO);
        }
    }

    #[test]
    fn restart_after_reset_fires_completion_again() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 5);
        t.start();
        clock.advance_secs(5);
        assert!(t.tick());

        t.reset();
        t.configure(0, 0, 5);
        t.start();
        clock.advance_secs(5);
        assert!(t.tick());
    }

    #[test]
    fn start_from_completed_is_noop() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 1);
        t.start();
        clock.advance_secs(1);
        assert!(t.tick());
        assert!(!t.start());
        assert_eq!(t.state(), TimerState::Completed);
    }

    #[test]
    fn toggle_walks_the_cycle() {
        let (mut t, clock) = timer();
        t.configure(0, 0, 2);

        t.toggle();
        assert_eq!(t.state(), TimerState::Running);
        t.toggle();
        assert_eq!(t.state(), TimerState::Paused);
        t.toggle();
        assert_eq!(t.state(), TimerState::Running);

        clock.advance_secs(2);
        assert!(t.tick());
        t.toggle();
        assert_eq!(t.state(), TimerState::Stopped);
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn preset_replaces_configuration() {
        let (mut t, _) = timer();
        for minutes in PRESET_MINUTES {
            assert!(t.set_preset(minutes));
            assert_eq!(t.pending(), Some(Duration::from_secs(minutes * 60)));
        }
    }

    #[test]
    fn invalid_preset_leaves_running_timer_alone() {
        let (mut t, clock) = timer();
        t.configure(0, 10, 0);
        t.start();
        clock.advance_secs(60);
        let _ = t.tick();

        assert!(!t.set_preset(0));
        assert!(!t.set_preset(u64::MAX));
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.total(), Duration::from_secs(600));
        assert_eq!(t.remaining(), Duration::from_secs(540));
        assert_eq!(t.pending(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn valid_preset_resets_running_timer() {
        let (mut t, _) = timer();
        t.configure(0, 10, 0);
        t.start();

        assert!(t.set_preset(25));
        assert_eq!(t.state(), TimerState::Stopped);
        assert_eq!(t.pending(), Some(Duration::from_secs(1500)));
    }

    #[test]
    fn title_is_trimmed_and_blank_ignored() {
        let (mut t, _) = timer();
        assert!(!t.set_title("   "));
        assert!(!t.set_title(""));
        assert_eq!(t.title(), "Timer");

        assert!(t.set_title("  Tea  "));
        assert_eq!(t.title(), "Tea");
    }

    #[test]
    fn snapshot_reports_display_fields() {
        let (mut t, clock) = timer();
        t.configure(1, 0, 0);
        t.start();
        clock.advance_secs(900);
        let _ = t.tick();

        let snap = t.snapshot();
        assert_eq!(snap.state, TimerState::Running);
        assert_eq!(snap.total_seconds, 3600.0);
        assert_eq!(snap.remaining_seconds, 2700.0);
        assert_eq!(snap.formatted, "45:00");
        assert_eq!(snap.compact, "45m 0s");
        assert!((snap.progress - 0.25).abs() < 1e-9);
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&TimerState::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
