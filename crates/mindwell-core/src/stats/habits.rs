//! Habit aggregates: today's completion rate, streaks and weekly progress.

use crate::wellness::{CompletionRecord, Habit};

/// Number of trailing history records the weekly progress is computed over.
pub const PROGRESS_WINDOW: usize = 7;

/// Percentage of habits completed today, rounded. Zero when there are no habits.
pub fn compute_habit_completion_rate(habits: &[Habit]) -> u8 {
    let total = habits.len();
    if total == 0 {
        return 0;
    }
    percent(completed_today_count(habits), total)
}

pub fn completed_today_count(habits: &[Habit]) -> usize {
    habits.iter().filter(|h| h.completed_today).count()
}

/// Re-derive `completed_today` from each habit's record for `today`.
///
/// The stored flag describes whichever day the habit was last toggled on;
/// after midnight it no longer holds. Returns how many flags changed.
pub fn refresh_completed_today(habits: &mut [Habit], today: &str) -> usize {
    let mut changed = 0;
    for habit in habits.iter_mut() {
        let done = habit.record_for(today).is_some_and(|r| r.completed);
        if habit.completed_today != done {
            habit.completed_today = done;
            changed += 1;
        }
    }
    changed
}

/// Longest current streak across all habits.
pub fn best_streak(habits: &[Habit]) -> u32 {
    habits.iter().map(|h| h.streak_count).max().unwrap_or(0)
}

/// Progress over the trailing [`PROGRESS_WINDOW`] history records.
///
/// The denominator is always the full window, so a habit with fewer records
/// than the window reports a proportionally lower percentage.
pub fn weekly_progress(history: &[CompletionRecord]) -> u8 {
    let start = history.len().saturating_sub(PROGRESS_WINDOW);
    let completed = history[start..].iter().filter(|r| r.completed).count();
    percent(completed, PROGRESS_WINDOW)
}

/// Flip today's completion for `habit`.
///
/// Upserts the history record for `today`, adjusts the streak (+1 when
/// marking done, -1 floored at zero when unmarking) and recomputes weekly
/// progress. The input is left untouched.
pub fn toggle_habit_completion(habit: &Habit, today: &str) -> Habit {
    let mut updated = habit.clone();
    let completed = !habit.completed_today;

    match updated
        .completion_history
        .iter_mut()
        .find(|r| r.date_label == today)
    {
        Some(record) => record.completed = completed,
        None => updated.completion_history.push(CompletionRecord {
            date_label: today.to_string(),
            completed,
        }),
    }

    updated.completed_today = completed;
    updated.streak_count = if completed {
        habit.streak_count.saturating_add(1)
    } else {
        habit.streak_count.saturating_sub(1)
    };
    updated.progress_percent = weekly_progress(&updated.completion_history);
    updated
}

fn percent(part: usize, whole: usize) -> u8 {
    ((part as f64 / whole as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
