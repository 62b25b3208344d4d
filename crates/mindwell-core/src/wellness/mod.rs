//! Wellness records kept on the client: mood entries and habits.
//!
//! Both serialize with camelCase field names so the stored JSON arrays keep
//! the same shape as the `moodHistory` / `habitHistory` keys of the web
//! client.

mod habit;
mod mood;

pub use habit::{CompletionRecord, Habit, HabitCategory, HabitDraft};
pub use mood::{MoodEntry, MoodLevel, MAX_NOTE_CHARS};

/// Date label used for habit completion records, e.g. `2025-06-01`.
pub fn habit_day_label(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Milliseconds since the Unix epoch for `at`.
pub(crate) fn epoch_ms(at: chrono::DateTime<chrono::Utc>) -> i64 {
    at.timestamp_millis()
}
