//! Mood and habit controller over the local store.
//!
//! [`WellnessTracker`] owns the store and the session. Every mutation is
//! written back immediately; the in-memory copy stays authoritative for the
//! rest of the run even when a write is dropped for quota.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, StoreError, ValidationError};
use crate::gateway::{RemoteMood, REMOTE_ID_PREFIX};
use crate::session::{FeatureGate, LocalTokenVault, PremiumFeature, Session, TokenVault};
use crate::stats::{
    compute_habit_completion_rate, compute_mood_insights, refresh_completed_today, toggle_habit_completion,
    MoodInsights,
};
use crate::storage::{keys, LocalStore, StoreBatch};
use crate::wellness::{Habit, HabitDraft, MoodEntry, MoodLevel};

/// How far apart a local entry and a server entry may be stamped and still
/// count as the same mood.
pub const SAME_MOOD_WINDOW_MS: i64 = 2 * 60 * 1000;

pub struct WellnessTracker {
    store: LocalStore,
    session: Session,
    moods: Vec<MoodEntry>,
    habits: Vec<Habit>,
}

impl WellnessTracker {
    /// Load moods and habits from `store`.
    pub fn new(store: LocalStore, session: Session) -> Self {
        let moods = store.load(keys::MOOD_HISTORY);
        let habits = store.load(keys::HABIT_HISTORY);
        Self {
            store,
            session,
            moods,
            habits,
        }
    }

    /// Load the session persisted with the local token vault as well.
    pub fn open(store: LocalStore) -> Result<Self, StoreError> {
        let session = Session::restore(&store, &LocalTokenVault::new(&store))?;
        Ok(Self::new(store, session))
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Write the session through `vault`.
    pub fn persist_session(&self, vault: &dyn TokenVault) -> Result<(), StoreError> {
        self.session.persist(&self.store, vault)
    }

    // ── Moods ────────────────────────────────────────────────────────

    /// Log a mood, newest first.
    ///
    /// # Errors
    /// Returns a validation error when `value` is outside 1..=5 or the note
    /// is too long.
    pub fn log_mood(&mut self, value: u8, note: &str, now: DateTime<Utc>) -> Result<&MoodEntry, ValidationError> {
        let mood = MoodLevel::try_from(value)?;
        let entry = MoodEntry::new(mood, note, now)?;
        tracing::debug!(id = %entry.id, mood = value, "mood logged");
        self.moods.insert(0, entry);
        self.store.save(keys::MOOD_HISTORY, &self.moods);
        Ok(&self.moods[0])
    }

    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    pub fn mood_insights(&self, now: DateTime<Utc>) -> MoodInsights {
        compute_mood_insights(&self.moods, now)
    }

    /// Record that local entry `local_id` was stored on the server as
    /// `remote`. The entry takes the server-derived id so a later merge
    /// recognises it.
    pub fn link_remote_mood(&mut self, local_id: &str, remote: &RemoteMood) -> Result<&MoodEntry, ValidationError> {
        let idx = self
            .moods
            .iter()
            .position(|m| m.id == local_id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "mood".into(),
                id: local_id.to_string(),
            })?;
        self.moods[idx].id = remote.local_id();
        self.store.save(keys::MOOD_HISTORY, &self.moods);
        Ok(&self.moods[idx])
    }

    /// Fold server history into the local list.
    ///
    /// Entries are matched by id and the local copy wins. A local entry that
    /// was never linked to the server matches a remote one with the same
    /// mood and note stamped within [`SAME_MOOD_WINDOW_MS`]; it keeps its
    /// content and takes the remote id. The result is re-sorted newest first
    /// and saved. Returns how many entries were new.
    pub fn merge_remote_moods(&mut self, remote: Vec<MoodEntry>) -> usize {
        let mut added = 0;
        let mut linked = 0;
        for entry in remote {
            if self.moods.iter().any(|m| m.id == entry.id) {
                continue;
            }
            if let Some(local) = self.moods.iter_mut().find(|m| is_unlinked_copy(m, &entry)) {
                local.id = entry.id;
                linked += 1;
                continue;
            }
            self.moods.push(entry);
            added += 1;
        }
        self.moods
            .sort_by(|a, b| b.created_at_epoch_ms.cmp(&a.created_at_epoch_ms));
        if added + linked > 0 {
            tracing::info!(added, linked, "merged remote mood history");
            self.store.save(keys::MOOD_HISTORY, &self.moods);
        }
        added
    }

    // ── Habits ───────────────────────────────────────────────────────

    /// Start tracking a habit.
    ///
    /// # Errors
    /// Validation errors for a blank name or zero target; a gate error when
    /// a Free plan already tracks the maximum number of habits.
    pub fn add_habit(&mut self, draft: HabitDraft, now: DateTime<Utc>) -> Result<&Habit, CoreError> {
        FeatureGate::for_session(&self.session, now).check(&PremiumFeature::AdditionalHabit {
            current: self.habits.len(),
        })?;
        let habit = Habit::new(draft, now)?;
        tracing::debug!(id = %habit.id, name = %habit.name, "habit added");
        self.habits.push(habit);
        self.store.save(keys::HABIT_HISTORY, &self.habits);
        let last = self.habits.len() - 1;
        Ok(&self.habits[last])
    }

    /// Align every habit's `completed_today` with `today`. Call once per
    /// run before reading habits; flags left over from an earlier day are
    /// cleared and saved.
    pub fn roll_over(&mut self, today: &str) -> usize {
        let changed = refresh_completed_today(&mut self.habits, today);
        if changed > 0 {
            tracing::debug!(changed, today, "habit flags rolled over");
            self.store.save(keys::HABIT_HISTORY, &self.habits);
        }
        changed
    }

    /// Flip completion of habit `id` for `today`.
    ///
    /// `completed_today` is first re-read from today's history record, so a
    /// flag left over from a previous day does not carry across midnight.
    pub fn toggle_habit(&mut self, id: &str, today: &str) -> Result<&Habit, ValidationError> {
        let idx = self.habit_index(id)?;
        refresh_completed_today(&mut self.habits[idx..=idx], today);
        self.habits[idx] = toggle_habit_completion(&self.habits[idx], today);
        self.store.save(keys::HABIT_HISTORY, &self.habits);
        Ok(&self.habits[idx])
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Habit, ValidationError> {
        let idx = self.habit_index(id)?;
        let removed = self.habits.remove(idx);
        tracing::debug!(id, "habit deleted");
        self.store.save(keys::HABIT_HISTORY, &self.habits);
        Ok(removed)
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn completion_rate(&self) -> u8 {
        compute_habit_completion_rate(&self.habits)
    }

    fn habit_index(&self, id: &str) -> Result<usize, ValidationError> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "habit".into(),
                id: id.to_string(),
            })
    }

    // ── Bulk ─────────────────────────────────────────────────────────

    /// Write moods and habits together in one transaction.
    pub fn save_all(&self) -> Result<(), StoreError> {
        let batch = StoreBatch::new()
            .put(keys::MOOD_HISTORY, &self.moods)?
            .put(keys::HABIT_HISTORY, &self.habits)?;
        self.store.save_batch(batch)
    }

    /// Clear every stored key, including the session.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.reset()?;
        self.moods.clear();
        self.habits.clear();
        self.session = Session::anonymous();
        Ok(())
    }
}

fn is_unlinked_copy(local: &MoodEntry, remote: &MoodEntry) -> bool {
    !local.id.starts_with(REMOTE_ID_PREFIX)
        && local.mood == remote.mood
        && local.note == remote.note
        && (local.created_at_epoch_ms - remote.created_at_epoch_ms).abs() <= SAME_MOOD_WINDOW_MS
}
