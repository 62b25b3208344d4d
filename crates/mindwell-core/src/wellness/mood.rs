use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Longest note accepted on a mood entry.
pub const MAX_NOTE_CHARS: usize = 500;

/// A mood on the 1 (very sad) to 5 (very happy) scale.
///
/// Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MoodLevel {
    VerySad = 1,
    Sad = 2,
    Neutral = 3,
    Happy = 4,
    VeryHappy = 5,
}

impl MoodLevel {
    pub const ALL: [MoodLevel; 5] = [
        MoodLevel::VerySad,
        MoodLevel::Sad,
        MoodLevel::Neutral,
        MoodLevel::Happy,
        MoodLevel::VeryHappy,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodLevel::VerySad => "😢",
            MoodLevel::Sad => "😞",
            MoodLevel::Neutral => "😐",
            MoodLevel::Happy => "😊",
            MoodLevel::VeryHappy => "😄",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodLevel::VerySad => "Very Sad",
            MoodLevel::Sad => "Sad",
            MoodLevel::Neutral => "Neutral",
            MoodLevel::Happy => "Happy",
            MoodLevel::VeryHappy => "Very Happy",
        }
    }
}

impl TryFrom<u8> for MoodLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MoodLevel::VerySad),
            2 => Ok(MoodLevel::Sad),
            3 => Ok(MoodLevel::Neutral),
            4 => Ok(MoodLevel::Happy),
            5 => Ok(MoodLevel::VeryHappy),
            other => Err(ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("must be between 1 and 5, got {other}"),
            }),
        }
    }
}

impl From<MoodLevel> for u8 {
    fn from(level: MoodLevel) -> Self {
        level.value()
    }
}

/// One logged mood. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub date_label: String,
    #[serde(rename = "moodValue")]
    pub mood: MoodLevel,
    #[serde(default)]
    pub note: String,
    pub created_at_epoch_ms: i64,
}

impl MoodEntry {
    /// Build a new entry stamped at `at`.
    ///
    /// # Errors
    /// Returns a validation error when the note exceeds [`MAX_NOTE_CHARS`].
    pub fn new(mood: MoodLevel, note: &str, at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let note = note.trim();
        let len = note.chars().count();
        if len > MAX_NOTE_CHARS {
            return Err(ValidationError::TooLong {
                field: "note".into(),
                max: MAX_NOTE_CHARS,
                len,
            });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date_label: at.format("%b %d").to_string(),
            mood,
            note: note.to_string(),
            created_at_epoch_ms: super::epoch_ms(at),
        })
    }

    pub fn emoji(&self) -> &'static str {
        self.mood.emoji()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mood_level_rejects_out_of_range() {
        assert!(MoodLevel::try_from(0).is_err());
        assert!(MoodLevel::try_from(6).is_err());
        assert_eq!(MoodLevel::try_from(4).unwrap(), MoodLevel::Happy);
    }

    #[test]
    fn entry_derives_emoji_and_label() {
        let at = Utc.with_ymd_and_hms(2025, 12, 26, 9, 0, 0).unwrap();
        let entry = MoodEntry::new(MoodLevel::Neutral, "  Quiet day at home ", at).unwrap();
        assert_eq!(entry.emoji(), "😐");
        assert_eq!(entry.date_label, "Dec 26");
        assert_eq!(entry.note, "Quiet day at home");
        assert_eq!(entry.created_at_epoch_ms, at.timestamp_millis());
    }

    #[test]
    fn note_length_is_bounded() {
        let long = "x".repeat(MAX_NOTE_CHARS + 1);
        let err = MoodEntry::new(MoodLevel::Sad, &long, Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 500, .. }));

        let exact = "y".repeat(MAX_NOTE_CHARS);
        assert!(MoodEntry::new(MoodLevel::Sad, &exact, Utc::now()).is_ok());
    }

    #[test]
    fn stored_shape_uses_mood_value_key() {
        let entry = MoodEntry::new(MoodLevel::VeryHappy, "", Utc::now()).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["moodValue"], 5);
        assert!(json.get("createdAtEpochMs").is_some());

        let bad = serde_json::json!({
            "id": "a", "dateLabel": "Today", "moodValue": 9, "createdAtEpochMs": 0
        });
        assert!(serde_json::from_value::<MoodEntry>(bad).is_err());
    }
}
