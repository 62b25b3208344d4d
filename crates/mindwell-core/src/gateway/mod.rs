//! Remote gateway: thin async client for the MindWell REST API.
//!
//! The backend itself is an external collaborator; this module only encodes
//! the request/response contract of the endpoints the client consumes.

mod auth;
mod client;
mod content;
mod payment;

pub use auth::{normalize_auth_response, AuthResponse, SessionUser};
pub use client::ApiClient;
pub use content::{JournalEntry, JournalPage, Post, RemoteMood, REMOTE_ID_PREFIX};
pub use payment::{CancellationResult, PaymentRecord, PaymentVerification, SubscriptionStatus};

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a backend timestamp. Accepts RFC 3339, and naive ISO-8601 values
/// (the backend's `isoformat()` output) which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
