use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Habit grouping shown on the habit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    #[default]
    Wellness,
    Mindfulness,
    Physical,
    Social,
}

impl HabitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Wellness => "wellness",
            HabitCategory::Mindfulness => "mindfulness",
            HabitCategory::Physical => "physical",
            HabitCategory::Social => "social",
        }
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wellness" => Ok(HabitCategory::Wellness),
            "mindfulness" => Ok(HabitCategory::Mindfulness),
            "physical" => Ok(HabitCategory::Physical),
            "social" => Ok(HabitCategory::Social),
            other => Err(ValidationError::InvalidValue {
                field: "category".into(),
                message: format!("unknown category '{other}'"),
            }),
        }
    }
}

/// Whether a habit was done on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub date_label: String,
    pub completed: bool,
}

/// User input for a new habit.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitDraft {
    pub name: String,
    pub category: HabitCategory,
    pub target_per_day: u32,
    pub unit: String,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, category: HabitCategory) -> Self {
        Self {
            name: name.into(),
            category,
            target_per_day: 1,
            unit: "times".into(),
        }
    }

    pub fn with_target(mut self, target_per_day: u32, unit: impl Into<String>) -> Self {
        self.target_per_day = target_per_day;
        self.unit = unit.into();
        self
    }
}

/// A tracked habit and its completion history.
///
/// `completion_history` holds at most one record per date label, in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub category: HabitCategory,
    pub target_per_day: u32,
    pub unit: String,
    pub streak_count: u32,
    pub progress_percent: u8,
    pub completed_today: bool,
    pub created_at_epoch_ms: i64,
    #[serde(default)]
    pub completion_history: Vec<CompletionRecord>,
}

impl Habit {
    /// Create a fresh habit from a draft.
    ///
    /// # Errors
    /// Returns a validation error when the name is blank or the target is zero.
    pub fn new(draft: HabitDraft, at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("habit name".into()));
        }
        if draft.target_per_day == 0 {
            return Err(ValidationError::InvalidValue {
                field: "target".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: draft.category,
            target_per_day: draft.target_per_day,
            unit: draft.unit.trim().to_string(),
            streak_count: 0,
            progress_percent: 0,
            completed_today: false,
            created_at_epoch_ms: super::epoch_ms(at),
            completion_history: Vec::new(),
        })
    }

    /// History record for `date_label`, if any.
    pub fn record_for(&self, date_label: &str) -> Option<&CompletionRecord> {
        self.completion_history
            .iter()
            .find(|r| r.date_label == date_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let err = Habit::new(HabitDraft::new("   ", HabitCategory::Social), Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::Required("habit name".into()));
    }

    #[test]
    fn new_habit_starts_empty() {
        let habit = Habit::new(
            HabitDraft::new("Daily Walk", HabitCategory::Physical).with_target(30, "minutes"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(habit.streak_count, 0);
        assert_eq!(habit.progress_percent, 0);
        assert!(!habit.completed_today);
        assert!(habit.completion_history.is_empty());
        assert_eq!(habit.unit, "minutes");
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Mindfulness".parse::<HabitCategory>().unwrap(), HabitCategory::Mindfulness);
        assert!("sleep".parse::<HabitCategory>().is_err());
    }

    #[test]
    fn stored_shape_is_camel_case() {
        let habit = Habit::new(HabitDraft::new("Read", HabitCategory::Wellness), Utc::now()).unwrap();
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["category"], "wellness");
        assert!(json.get("streakCount").is_some());
        assert!(json.get("completionHistory").is_some());
    }
}
