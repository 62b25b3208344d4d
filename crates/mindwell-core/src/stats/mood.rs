//! Mood insights: most frequent mood, overall and trailing-week averages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wellness::{MoodEntry, MoodLevel};

/// Width of the weekly window in milliseconds.
pub const WEEK_MS: i64 = 7 * 24 * 3600 * 1000;

/// Derived mood figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoodInsights {
    /// No entries logged; render the empty state.
    NoData,
    Summary(MoodSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub most_common: MoodLevel,
    /// Mean mood over all entries, one decimal place.
    pub average: f64,
    /// Mean over entries from the last seven days, one decimal place.
    /// `None` when no entry falls inside the window.
    pub weekly_average: Option<f64>,
    pub total_entries: usize,
    pub weekly_entries: usize,
}

impl MoodInsights {
    pub fn summary(&self) -> Option<&MoodSummary> {
        match self {
            MoodInsights::NoData => None,
            MoodInsights::Summary(s) => Some(s),
        }
    }
}

/// Compute insights over `entries` relative to `now`.
///
/// Ties for the most frequent mood go to the value encountered first when
/// scanning `entries` from the front.
pub fn compute_mood_insights(entries: &[MoodEntry], now: DateTime<Utc>) -> MoodInsights {
    if entries.is_empty() {
        return MoodInsights::NoData;
    }

    let counts = mood_distribution(entries);
    let mut most_common = entries[0].mood;
    let mut best = 0usize;
    for entry in entries {
        let count = counts[usize::from(entry.mood.value() - 1)];
        if count > best {
            best = count;
            most_common = entry.mood;
        }
    }

    let now_ms = now.timestamp_millis();
    let weekly: Vec<&MoodEntry> = entries
        .iter()
        .filter(|e| now_ms - e.created_at_epoch_ms <= WEEK_MS)
        .collect();

    MoodInsights::Summary(MoodSummary {
        most_common,
        average: one_decimal(mean(entries.iter())),
        weekly_average: if weekly.is_empty() {
            None
        } else {
            Some(one_decimal(mean(weekly.iter().copied())))
        },
        total_entries: entries.len(),
        weekly_entries: weekly.len(),
    })
}

/// Entry count per mood value, indexed `value - 1`.
pub fn mood_distribution(entries: &[MoodEntry]) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for entry in entries {
        counts[usize::from(entry.mood.value() - 1)] += 1;
    }
    counts
}

fn mean<'a>(entries: impl Iterator<Item = &'a MoodEntry>) -> f64 {
    let (sum, n) = entries.fold((0u64, 0u64), |(sum, n), e| {
        (sum + u64::from(e.mood.value()), n + 1)
    });
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
