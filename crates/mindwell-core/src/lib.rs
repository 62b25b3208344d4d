//! # MindWell Core Library
//!
//! This library provides the client-side logic of the MindWell mental
//! wellness tracker. It follows a CLI-first philosophy: every operation is
//! available through the standalone `mindwell-cli` binary, and any graphical
//! front end is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Wellness records**: mood entries and habits kept on the device
//! - **Stats**: pure aggregators (mood insights, completion rate, streaks)
//! - **Storage**: SQLite key-value store with a byte quota, TOML configuration
//! - **Gateway**: async client for the MindWell REST backend
//! - **Session**: explicit login/plan state machine and the Premium gate
//! - **Export**: text and CSV wellness reports
//! - **Meditation**: wall-clock breathing timer driven by `tick()`
//! - **Crisis**: hotline directory and grounding exercises, on every plan
//!
//! ## Key Components
//!
//! - [`WellnessTracker`]: mood and habit controller over the local store
//! - [`LocalStore`]: quota-checked persistence
//! - [`ApiClient`]: backend endpoints
//! - [`Session`]: authentication and subscription tier
//! - [`MeditationTimer`]: guided meditation state machine

pub mod affirmation;
pub mod crisis;
pub mod error;
pub mod events;
pub mod export;
pub mod gateway;
pub mod meditation;
pub mod session;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod wellness;

pub use error::{
    ConfigError, CoreError, GateError, GatewayError, SessionError, StoreError, ValidationError,
};
pub use events::Event;
pub use export::{ExportFormat, ProfileSnapshot};
pub use gateway::ApiClient;
pub use meditation::{BreathingPattern, MeditationTimer, TimerState};
pub use session::{FeatureGate, PlanTier, PremiumFeature, Session, SessionState};
pub use stats::MoodInsights;
pub use storage::{Config, LocalStore};
pub use tracker::WellnessTracker;
pub use wellness::{Habit, HabitCategory, HabitDraft, MoodEntry, MoodLevel};
