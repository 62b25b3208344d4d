//! Guided meditation timer.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads - the caller passes the current time to every command and calls
//! `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            +-> Completed -> (reset) Idle
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pattern::{BreathPhase, BreathingPattern};
use crate::error::ValidationError;
use crate::events::Event;

/// Session lengths offered, in minutes.
pub const DURATION_CHOICES_MIN: [u32; 5] = [5, 10, 15, 20, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeditationTimer {
    pattern: BreathingPattern,
    state: TimerState,
    duration_ms: u64,
    /// Remaining time in milliseconds.
    remaining_ms: u64,
    /// Epoch milliseconds of the last start/resume/tick while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<i64>,
    /// Phase reported by the last PhaseChanged event.
    #[serde(default)]
    last_phase: Option<BreathPhase>,
}

impl MeditationTimer {
    /// Timer for one of the [`DURATION_CHOICES_MIN`] lengths.
    pub fn new(minutes: u32, pattern: BreathingPattern) -> Result<Self, ValidationError> {
        if !DURATION_CHOICES_MIN.contains(&minutes) {
            return Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!("choose one of {DURATION_CHOICES_MIN:?} minutes"),
            });
        }
        let duration_ms = u64::from(minutes) * 60_000;
        Ok(Self {
            pattern,
            state: TimerState::Idle,
            duration_ms,
            remaining_ms: duration_ms,
            last_tick_epoch_ms: None,
            last_phase: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn pattern(&self) -> BreathingPattern {
        self.pattern
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.duration_ms - self.remaining_ms
    }

    /// 0.0 .. 100.0
    pub fn progress_pct(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.elapsed_ms() as f64 / self.duration_ms as f64 * 100.0
    }

    pub fn current_phase(&self) -> BreathPhase {
        self.pattern.phase_at(self.elapsed_ms()).0
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state,
            pattern: self.pattern.to_string(),
            phase: self.current_phase(),
            remaining_ms: self.remaining_ms,
            total_ms: self.duration_ms,
            progress_pct: self.progress_pct(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now.timestamp_millis());
                self.last_phase = Some(self.current_phase());
                Some(Event::MeditationStarted {
                    duration_secs: self.duration_ms / 1000,
                    pattern: self.pattern.to_string(),
                    at: now,
                })
            }
            TimerState::Paused => self.resume(now),
            TimerState::Running | TimerState::Completed => None,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms == 0 {
            return self.tick(now);
        }
        self.state = TimerState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::MeditationPaused {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        self.last_tick_epoch_ms = Some(now.timestamp_millis());
        Some(Event::MeditationResumed {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    /// Back to Idle with the full duration.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_ms = self.duration_ms;
        self.last_tick_epoch_ms = None;
        self.last_phase = None;
        Some(Event::MeditationReset { at: now })
    }

    /// Call periodically. Returns `MeditationCompleted` when time runs out,
    /// or `PhaseChanged` when the breathing guide moves on.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms == 0 {
            self.state = TimerState::Completed;
            self.last_tick_epoch_ms = None;
            return Some(Event::MeditationCompleted {
                duration_secs: self.duration_ms / 1000,
                at: now,
            });
        }

        let phase = self.current_phase();
        if self.last_phase == Some(phase) {
            return None;
        }
        self.last_phase = Some(phase);
        Some(Event::PhaseChanged {
            phase,
            prompt: phase.prompt().to_string(),
            phase_secs: self.pattern.phase_secs(phase),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        if let Some(last) = self.last_tick_epoch_ms {
            let now_ms = now.timestamp_millis();
            let elapsed = u64::try_from(now_ms - last).unwrap_or(0);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now_ms.max(last));
        }
    }
}

/// `m:ss` clock text.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
