//! SQLite-backed key-value store for client-held records.
//!
//! Each key holds either a JSON array of records (`moodHistory`,
//! `habitHistory`) or a plain string (`userPlan`, `mindwell_token`, ...).
//! Writes are checked against a byte quota the way browser local storage
//! is. [`LocalStore::save`] drops over-quota writes with a warning;
//! [`LocalStore::try_save`] surfaces them.
//!
//! Single writes are independent. Use [`StoreBatch`] when several keys must
//! change together.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data_dir;
use crate::error::{CoreError, StoreError};

/// Five MiB, the usual browser local-storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Keys written by the client.
pub mod keys {
    pub const AUTH_TOKEN: &str = "mindwell_token";
    pub const MOOD_HISTORY: &str = "moodHistory";
    pub const HABIT_HISTORY: &str = "habitHistory";
    pub const USER_PLAN: &str = "userPlan";
    pub const USER_JOIN_DATE: &str = "userJoinDate";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_NAME: &str = "userName";
    pub const PREMIUM_EXPIRES_AT: &str = "premiumExpiresAt";
    pub const MEDITATION_TIMER: &str = "meditationTimer";
}

/// Persistent key-value store.
pub struct LocalStore {
    conn: Connection,
    quota_bytes: usize,
}

impl LocalStore {
    /// Open the store at `~/.config/mindwell/mindwell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(quota_bytes: usize) -> Result<Self, CoreError> {
        let path = data_dir()?.join("mindwell.db");
        Ok(Self::open_at(&path, quota_bytes)?)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path, quota_bytes: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn, quota_bytes };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store.
    pub fn open_memory(quota_bytes: usize) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, quota_bytes };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    /// Bytes currently stored (keys plus values).
    pub fn used_bytes(&self) -> Result<usize, StoreError> {
        self.used_bytes_except(&[])
    }

    // ── Record arrays ────────────────────────────────────────────────

    /// Load the array stored under `key`.
    ///
    /// A missing key, or one whose contents no longer decode, yields an
    /// empty vector. Decode failures are logged.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.kv_get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read local store key");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable local store value");
                Vec::new()
            }
        }
    }

    /// Persist `items` under `key`, logging and dropping the write on failure.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) {
        if let Err(e) = self.try_save(key, items) {
            match e {
                StoreError::QuotaExceeded { needed, quota, .. } => {
                    tracing::warn!(key, needed, quota, "storage quota exceeded; write dropped");
                }
                other => tracing::warn!(key, error = %other, "local store write dropped"),
            }
        }
    }

    /// Persist `items` under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::QuotaExceeded`] if the write would push the
    /// store past its quota, or a query/serialization error.
    pub fn try_save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let value = encode(key, items)?;
        self.kv_set(key, &value)
    }

    /// Apply every write in `batch` in one transaction.
    ///
    /// Either all keys change or none do. The quota is checked against the
    /// combined result.
    pub fn save_batch(&self, batch: StoreBatch) -> Result<(), StoreError> {
        if batch.writes.is_empty() {
            return Ok(());
        }
        let keys: Vec<&str> = batch.writes.iter().map(|(k, _)| k.as_str()).collect();
        let incoming: usize = batch.writes.iter().map(|(k, v)| k.len() + v.len()).sum();
        let needed = self.used_bytes_except(&keys)? + incoming;
        if needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                key: keys.join(","),
                needed,
                quota: self.quota_bytes,
            });
        }

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in &batch.writes {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Scalar strings ───────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store, subject to the quota.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let needed = self.used_bytes_except(&[key])? + key.len() + value.len();
        if needed > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota_bytes,
            });
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Remove every key. This is the only way mood entries are ever deleted.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv", [])?;
        tracing::info!("local store reset");
        Ok(())
    }

    fn used_bytes_except(&self, excluded: &[&str]) -> Result<usize, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, LENGTH(CAST(value AS BLOB)) FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut total = 0usize;
        for row in rows {
            let (key, len) = row?;
            if !excluded.contains(&key.as_str()) {
                total += key.len() + len.max(0) as usize;
            }
        }
        Ok(total)
    }
}

/// A set of writes applied atomically by [`LocalStore::save_batch`].
#[derive(Debug, Default)]
pub struct StoreBatch {
    writes: Vec<(String, String)>,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a record array.
    pub fn put<T: Serialize>(mut self, key: &str, items: &[T]) -> Result<Self, StoreError> {
        let value = encode(key, items)?;
        self.writes.push((key.to_string(), value));
        Ok(self)
    }

    /// Queue a plain string value.
    pub fn put_str(mut self, key: &str, value: &str) -> Self {
        self.writes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

fn encode<T: Serialize>(key: &str, items: &[T]) -> Result<String, StoreError> {
    serde_json::to_string(items).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        assert!(store.kv_get("test").unwrap().is_none());
        store.kv_set("test", "hello").unwrap();
        assert_eq!(store.kv_get("test").unwrap().unwrap(), "hello");
        store.kv_remove("test").unwrap();
        assert!(store.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn load_missing_key_is_empty() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        let items: Vec<u32> = store.load("nothing");
        assert!(items.is_empty());
    }

    #[test]
    fn load_corrupt_value_is_empty() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        store.kv_set(keys::MOOD_HISTORY, "{not json").unwrap();
        let items: Vec<u32> = store.load(keys::MOOD_HISTORY);
        assert!(items.is_empty());
    }

    #[test]
    fn save_and_load_array() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        store.save("numbers", &[3u32, 1, 2]);
        assert_eq!(store.load::<u32>("numbers"), vec![3, 1, 2]);
    }

    #[test]
    fn over_quota_write_is_dropped() {
        let store = LocalStore::open_memory(32).unwrap();
        store.save("small", &[1u8]);
        let big = vec![7u32; 100];
        store.save("big", &big);
        assert!(store.load::<u32>("big").is_empty());
        assert_eq!(store.load::<u8>("small"), vec![1]);

        let err = store.try_save("big", &big).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 32, .. }));
    }

    #[test]
    fn overwrite_does_not_double_count_quota() {
        let store = LocalStore::open_memory(20).unwrap();
        store.try_save("k", &[1u32, 2, 3, 4, 5]).unwrap();
        // Replacing the same key only needs room for the new value.
        store.try_save("k", &[5u32, 4, 3, 2, 1]).unwrap();
        assert_eq!(store.load::<u32>("k"), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let store = LocalStore::open_memory(64).unwrap();
        store.try_save("a", &[1u8]).unwrap();

        let too_big = StoreBatch::new()
            .put("a", &[2u8])
            .unwrap()
            .put("b", &vec![9u32; 50])
            .unwrap();
        assert!(store.save_batch(too_big).is_err());
        assert_eq!(store.load::<u8>("a"), vec![1]);
        assert!(store.load::<u32>("b").is_empty());

        let ok = StoreBatch::new()
            .put("a", &[2u8])
            .unwrap()
            .put_str(keys::USER_PLAN, "premium");
        assert_eq!(ok.len(), 2);
        store.save_batch(ok).unwrap();
        assert_eq!(store.load::<u8>("a"), vec![2]);
        assert_eq!(store.kv_get(keys::USER_PLAN).unwrap().as_deref(), Some("premium"));
    }

    #[test]
    fn reset_clears_everything() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        store.save(keys::MOOD_HISTORY, &[1u8]);
        store.kv_set(keys::USER_PLAN, "free").unwrap();
        store.reset().unwrap();
        assert_eq!(store.used_bytes().unwrap(), 0);
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        {
            let store = LocalStore::open_at(&path, DEFAULT_QUOTA_BYTES).unwrap();
            store.save(keys::HABIT_HISTORY, &["a".to_string()]);
        }
        let reopened = LocalStore::open_at(&path, DEFAULT_QUOTA_BYTES).unwrap();
        assert_eq!(reopened.load::<String>(keys::HABIT_HISTORY), vec!["a".to_string()]);
    }
}
