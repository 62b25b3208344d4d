//! Guided meditation: breathing patterns and the session timer.

mod pattern;
mod timer;

pub use pattern::{BreathPhase, BreathingPattern};
pub use timer::{format_clock, MeditationTimer, TimerState, DURATION_CHOICES_MIN};
