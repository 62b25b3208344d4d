//! Derived views over the locally stored mood and habit collections.
//!
//! Everything here is a pure function of its inputs; callers pass "now" or
//! "today" explicitly.

mod habits;
mod mood;

pub use habits::{
    best_streak, completed_today_count, compute_habit_completion_rate, refresh_completed_today,
    toggle_habit_completion, weekly_progress, PROGRESS_WINDOW,
};

pub use mood::{compute_mood_insights, mood_distribution, MoodInsights, MoodSummary, WEEK_MS};
