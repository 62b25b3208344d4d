//! Breathing patterns such as `4-7-8`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Longest single phase accepted, in seconds.
const MAX_PHASE_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
    HoldEmpty,
}

impl BreathPhase {
    pub const CYCLE: [BreathPhase; 4] = [
        BreathPhase::Inhale,
        BreathPhase::Hold,
        BreathPhase::Exhale,
        BreathPhase::HoldEmpty,
    ];

    /// Prompt shown while the phase lasts.
    pub fn prompt(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe In",
            BreathPhase::Hold | BreathPhase::HoldEmpty => "Hold",
            BreathPhase::Exhale => "Breathe Out",
        }
    }
}

/// Seconds spent in each phase of one breath.
///
/// Written `inhale-hold-exhale[-hold]`; a missing final hold is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
    pub hold_empty: u32,
}

impl BreathingPattern {
    pub const BOX: BreathingPattern = BreathingPattern::new(4, 4, 4, 4);
    pub const RELAXING: BreathingPattern = BreathingPattern::new(4, 7, 8, 0);
    pub const CALMING: BreathingPattern = BreathingPattern::new(6, 2, 6, 2);

    pub const fn new(inhale: u32, hold: u32, exhale: u32, hold_empty: u32) -> Self {
        Self {
            inhale,
            hold,
            exhale,
            hold_empty,
        }
    }

    /// The built-in patterns with their display label and description.
    pub fn presets() -> [(BreathingPattern, &'static str, &'static str); 3] {
        [
            (Self::BOX, "4-4-4-4 (Box)", "Equal breathing"),
            (Self::RELAXING, "4-7-8", "Relaxing breath"),
            (Self::CALMING, "6-2-6-2", "Calming rhythm"),
        ]
    }

    pub fn phase_secs(&self, phase: BreathPhase) -> u32 {
        match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::Hold => self.hold,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldEmpty => self.hold_empty,
        }
    }

    /// Length of one full breath in seconds.
    pub fn cycle_secs(&self) -> u32 {
        self.inhale + self.hold + self.exhale + self.hold_empty
    }

    /// Phase and seconds left in it, `elapsed_ms` into the exercise.
    /// Zero-length phases never come up.
    pub fn phase_at(&self, elapsed_ms: u64) -> (BreathPhase, u64) {
        let cycle_ms = u64::from(self.cycle_secs()) * 1000;
        let mut offset = elapsed_ms % cycle_ms.max(1);
        for phase in BreathPhase::CYCLE {
            let len = u64::from(self.phase_secs(phase)) * 1000;
            if offset < len {
                return (phase, len - offset);
            }
            offset -= len;
        }
        (BreathPhase::Inhale, u64::from(self.inhale) * 1000)
    }
}

impl Default for BreathingPattern {
    fn default() -> Self {
        Self::BOX
    }
}

impl fmt::Display for BreathingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.inhale, self.hold, self.exhale)?;
        if self.hold_empty > 0 {
            write!(f, "-{}", self.hold_empty)?;
        }
        Ok(())
    }
}

impl FromStr for BreathingPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| ValidationError::InvalidValue {
            field: "breathing pattern".into(),
            message,
        };

        let parts = s
            .trim()
            .split('-')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid(format!("'{s}' is not of the form inhale-hold-exhale[-hold]")))?;

        let pattern = match parts.as_slice() {
            [i, h, e] => Self::new(*i, *h, *e, 0),
            [i, h, e, h2] => Self::new(*i, *h, *e, *h2),
            _ => return Err(invalid(format!("'{s}' must have 3 or 4 phases"))),
        };
        if pattern.inhale == 0 || pattern.exhale == 0 {
            return Err(invalid("inhale and exhale must be at least 1 second".into()));
        }
        if BreathPhase::CYCLE
            .iter()
            .any(|p| pattern.phase_secs(*p) > MAX_PHASE_SECS)
        {
            return Err(invalid(format!("phases are limited to {MAX_PHASE_SECS} seconds")));
        }
        Ok(pattern)
    }
}
