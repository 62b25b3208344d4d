//! End-to-end flows: login, upgrade, habit gate, export.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use mindwell_core::export::{render_csv, DAYS_ACTIVE, HABITS_TRACKED, MOOD_ENTRIES};
use mindwell_core::gateway::{parse_timestamp, ApiClient};
use mindwell_core::session::{refresh_plan, TokenVault};
use mindwell_core::storage::DEFAULT_QUOTA_BYTES;
use mindwell_core::{
    HabitCategory, HabitDraft, LocalStore, PlanTier, ProfileSnapshot, Session, SessionState,
    StoreError, WellnessTracker,
};
use serde_json::json;

// ============================================================================
// In-memory vault standing in for the OS keyring
// ============================================================================

#[derive(Default)]
struct MemoryVault {
    token: Mutex<HashMap<&'static str, String>>,
}

impl TokenVault for MemoryVault {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.token.lock().unwrap().get("token").cloned())
    }

    fn store(&self, token: &str) -> Result<(), StoreError> {
        self.token.lock().unwrap().insert("token", token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.token.lock().unwrap().remove("token");
        Ok(())
    }
}

fn store() -> LocalStore {
    LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap()
}

#[tokio::test]
async fn login_upgrade_and_restore() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(
            json!({"access_token": "tok", "user": {"id": 1, "username": "ada", "email": "ada@example.com"}})
                .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("POST", "/api/payment/verify-payment")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(
            json!({"message": "ok", "subscription_status": "premium", "expires_at": "2099-01-01T00:00:00"})
                .to_string(),
        )
        .create_async()
        .await;

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let api = ApiClient::new(&server.url(), 2_000).unwrap();
    let vault = MemoryVault::default();
    let store = store();

    let mut session = Session::anonymous();
    session.begin_login().unwrap();
    let resp = api.login("ada@example.com", "pw").await.unwrap();
    session.complete_login(resp, now).unwrap();
    assert_eq!(session.state(), SessionState::Authenticated(PlanTier::Free));

    let api = api.with_token(session.token().map(str::to_string));
    let verification = api.verify_payment("ref-1").await.unwrap();
    let expires = verification.expires_at.as_deref().and_then(parse_timestamp);
    session.payment_verified(expires).unwrap();
    session.persist(&store, &vault).unwrap();

    let restored = Session::restore(&store, &vault).unwrap();
    assert_eq!(restored.state(), SessionState::Authenticated(PlanTier::Premium));
    assert!(restored.is_premium(now));
    assert_eq!(restored.user().unwrap().username, "ada");
}

#[tokio::test]
async fn login_picks_up_existing_premium() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(json!({"access_token": "tok", "user": {"id": 7, "username": "cy", "email": "cy@example.com"}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/payment/subscription-status")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(
            json!({"subscription_status": "premium", "is_premium": true, "expires_at": "2099-01-01T00:00:00"})
                .to_string(),
        )
        .create_async()
        .await;

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let api = ApiClient::new(&server.url(), 2_000).unwrap();
    let mut session = Session::anonymous();
    session.begin_login().unwrap();
    session
        .complete_login(api.login("cy@example.com", "pw").await.unwrap(), now)
        .unwrap();
    assert!(!session.is_premium(now));

    let api = api.with_token(session.token().map(str::to_string));
    let plan = refresh_plan(&mut session, &api).await.unwrap();
    assert_eq!(plan, PlanTier::Premium);
    assert!(session.is_premium(now));
}

#[tokio::test]
async fn refresh_plan_failure_keeps_free() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/payment/subscription-status")
        .with_status(500)
        .create_async()
        .await;

    let mut session = Session::anonymous();
    session.begin_login().unwrap();
    session
        .complete_login(
            mindwell_core::gateway::normalize_auth_response(&json!({"access_token": "t"}), "dee@example.com", None),
            Utc::now(),
        )
        .unwrap();
    let api = ApiClient::new(&server.url(), 2_000).unwrap().with_token(Some("t".into()));
    assert!(refresh_plan(&mut session, &api).await.is_err());
    assert_eq!(session.state(), SessionState::Authenticated(PlanTier::Free));
}

#[tokio::test]
async fn pushed_mood_survives_sync_once() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/mood/log")
        .with_status(201)
        .with_body(
            json!({"mood": {"id": 41, "mood": 5, "notes": "sunny walk", "created_at": "2025-06-01T09:00:03"}})
                .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/mood/history")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"moods": [
                {"id": 41, "mood": 5, "notes": "sunny walk", "created_at": "2025-06-01T09:00:03"},
                {"id": 40, "mood": 2, "notes": "", "created_at": "2025-05-30T20:00:00"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let api = ApiClient::new(&server.url(), 2_000).unwrap().with_token(Some("t".into()));
    let mut tracker = WellnessTracker::new(store(), Session::anonymous());

    let entry = tracker.log_mood(5, "sunny walk", now).unwrap().clone();
    let remote = api.log_mood(&entry).await.unwrap();
    tracker.link_remote_mood(&entry.id, &remote).unwrap();

    let history = api.fetch_mood_history(30).await.unwrap();
    let added = tracker.merge_remote_moods(history.iter().filter_map(|m| m.to_entry()).collect());
    assert_eq!(added, 1);
    assert_eq!(tracker.moods().len(), 2);
    assert_eq!(tracker.moods()[0].id, "server-41");
    assert_eq!(tracker.moods()[0].created_at_epoch_ms, now.timestamp_millis());

    let snapshot = ProfileSnapshot::build(tracker.session(), tracker.moods(), tracker.habits(), 0, now);
    assert_eq!(snapshot.stat(MOOD_ENTRIES), "2");
}

#[test]
fn premium_lifts_habit_cap() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let mut session = Session::anonymous();
    session.begin_login().unwrap();
    session
        .complete_login(
            mindwell_core::gateway::normalize_auth_response(&json!({"access_token": "t"}), "bo@example.com", None),
            now,
        )
        .unwrap();
    session.payment_verified(None).unwrap();

    let mut tracker = WellnessTracker::new(store(), session);
    for i in 0..8 {
        tracker
            .add_habit(HabitDraft::new(format!("habit {i}"), HabitCategory::Wellness), now)
            .unwrap();
    }
    assert_eq!(tracker.habits().len(), 8);

    // Cancelling drops back to the free cap for new habits.
    tracker.session_mut().downgrade().unwrap();
    assert!(tracker
        .add_habit(HabitDraft::new("one more", HabitCategory::Social), now)
        .is_err());
}

#[test]
fn export_csv_matches_tracker_state() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
    let mut tracker = WellnessTracker::new(store(), Session::anonymous());
    tracker.log_mood(4, "", now).unwrap();
    tracker.log_mood(2, "", now).unwrap();
    tracker
        .add_habit(HabitDraft::new("Stretch", HabitCategory::Physical), now)
        .unwrap();

    let snapshot = ProfileSnapshot::build(tracker.session(), tracker.moods(), tracker.habits(), 3, now);
    let csv = render_csv(&snapshot, now);

    for row in &snapshot.stats {
        assert!(csv.lines().any(|l| l == format!("{},{}", row.label, row.value)));
    }
    assert_eq!(snapshot.stat(MOOD_ENTRIES), "2");
    assert_eq!(snapshot.stat(HABITS_TRACKED), "1");
    assert_eq!(snapshot.stat(DAYS_ACTIVE), "1");
    assert!(csv.contains("\nJournal Entries,3\n"));
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindwell.db");
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

    {
        let store = LocalStore::open_at(&path, DEFAULT_QUOTA_BYTES).unwrap();
        let mut tracker = WellnessTracker::new(store, Session::anonymous());
        tracker.log_mood(5, "first", now).unwrap();
    }

    let store = LocalStore::open_at(&path, DEFAULT_QUOTA_BYTES).unwrap();
    let tracker = WellnessTracker::open(store).unwrap();
    assert_eq!(tracker.moods().len(), 1);
    assert_eq!(tracker.moods()[0].note, "first");
    assert_eq!(tracker.session().state(), SessionState::Anonymous);
}
