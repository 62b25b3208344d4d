use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meditation::{BreathPhase, TimerState};

/// Every meditation timer state change produces an Event.
/// Front ends render them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MeditationStarted {
        duration_secs: u64,
        pattern: String,
        at: DateTime<Utc>,
    },
    MeditationPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    MeditationResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The breathing guide moved to another phase.
    PhaseChanged {
        phase: BreathPhase,
        prompt: String,
        phase_secs: u32,
        at: DateTime<Utc>,
    },
    MeditationCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    MeditationReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        pattern: String,
        phase: BreathPhase,
        remaining_ms: u64,
        total_ms: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
