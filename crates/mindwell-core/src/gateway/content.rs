//! Journal, mood history, affirmation and community endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::ApiClient;
use super::parse_timestamp;
use crate::error::GatewayError;
use crate::wellness::{MoodEntry, MoodLevel};

/// Journal entry as listed by the backend (content may be truncated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    pub created_at: String,
}

/// One page of journal entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPage {
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

fn first_page() -> u32 {
    1
}

/// Id prefix of local entries that mirror a server-side mood.
pub const REMOTE_ID_PREFIX: &str = "server-";

/// A mood entry as stored on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMood {
    pub id: i64,
    pub mood: u8,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
}

impl RemoteMood {
    /// Id a local copy of this entry carries.
    pub fn local_id(&self) -> String {
        format!("{REMOTE_ID_PREFIX}{}", self.id)
    }

    /// Convert into a local entry. Entries with an out-of-range mood or an
    /// unparseable timestamp yield `None`.
    pub fn to_entry(&self) -> Option<MoodEntry> {
        let mood = MoodLevel::try_from(self.mood).ok()?;
        let at = parse_timestamp(&self.created_at)?;
        Some(MoodEntry {
            id: self.local_id(),
            date_label: at.format("%b %d").to_string(),
            mood,
            note: self.notes.clone().unwrap_or_default(),
            created_at_epoch_ms: at.timestamp_millis(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MoodHistoryBody {
    #[serde(default)]
    moods: Vec<RemoteMood>,
}

#[derive(Debug, Deserialize)]
struct MoodLogBody {
    mood: RemoteMood,
}

#[derive(Debug, Deserialize)]
struct JournalCreateBody {
    entry: JournalEntry,
}

/// Community post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(default = "anonymous")]
    pub author: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn anonymous() -> String {
    "Anonymous".into()
}

impl ApiClient {
    /// `GET /api/journal/entries?page=&per_page=`.
    pub async fn fetch_journal_entries(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<JournalPage, GatewayError> {
        let query = [
            ("page", page.max(1).to_string()),
            ("per_page", page_size.max(1).to_string()),
        ];
        self.request(Method::GET, "api/journal/entries", &query, None)
            .await
    }

    /// `POST /api/journal/entry`. The backend attaches a sentiment label.
    pub async fn create_journal_entry(
        &self,
        title: &str,
        content: &str,
    ) -> Result<JournalEntry, GatewayError> {
        let body = json!({ "title": title, "content": content });
        let created: JournalCreateBody = self
            .request(Method::POST, "api/journal/entry", &[], Some(&body))
            .await?;
        Ok(created.entry)
    }

    /// `GET /api/mood/history?days=`, newest first.
    pub async fn fetch_mood_history(&self, days: u32) -> Result<Vec<RemoteMood>, GatewayError> {
        let query = [("days", days.to_string())];
        let body: MoodHistoryBody = self
            .request(Method::GET, "api/mood/history", &query, None)
            .await?;
        Ok(body.moods)
    }

    /// `POST /api/mood/log`.
    pub async fn log_mood(&self, entry: &MoodEntry) -> Result<RemoteMood, GatewayError> {
        let body = json!({ "mood": entry.mood.value(), "notes": entry.note });
        let logged: MoodLogBody = self
            .request(Method::POST, "api/mood/log", &[], Some(&body))
            .await?;
        Ok(logged.mood)
    }

    /// `GET /api/ai/affirmation`.
    pub async fn fetch_affirmation(&self) -> Result<String, GatewayError> {
        let value: Value = self
            .request(Method::GET, "api/ai/affirmation", &[], None)
            .await?;
        value
            .get("affirmation")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Decode {
                endpoint: "api/ai/affirmation".into(),
                message: "missing affirmation".into(),
            })
    }

    /// `GET /api/community/posts`. Works without a token.
    pub async fn list_posts(&self) -> Result<Vec<Post>, GatewayError> {
        self.request(Method::GET, "api/community/posts", &[], None)
            .await
    }

    /// `POST /api/community/posts`. A missing author posts as "Anonymous".
    pub async fn create_post(&self, content: &str, author: Option<&str>) -> Result<Post, GatewayError> {
        let mut body = json!({ "content": content.trim() });
        if let Some(author) = author.filter(|a| !a.trim().is_empty()) {
            body["author"] = Value::String(author.trim().to_string());
        }
        self.request(Method::POST, "api/community/posts", &[], Some(&body))
            .await
    }
}
