//! State shared by every command: config, local store and session.

use std::future::Future;

use chrono::Utc;
use mindwell_core::session::{KeyringVault, LocalTokenVault};
use mindwell_core::storage::config::TokenStorage;
use mindwell_core::wellness::habit_day_label;
use mindwell_core::{ApiClient, Config, LocalStore, Session, SessionError, StoreError, WellnessTracker};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub struct Context {
    pub config: Config,
    pub tracker: WellnessTracker,
}

impl Context {
    /// Load config, open the store and restore the session. Habit flags
    /// are rolled over to today, and an expired token logs the user out
    /// here, before any command runs.
    pub fn load() -> CliResult<Self> {
        let config = Config::load_or_default();
        let store = LocalStore::open(config.storage.quota_bytes)?;
        let session = match config.session.token_storage {
            TokenStorage::Local => Session::restore(&store, &LocalTokenVault::new(&store))?,
            TokenStorage::Keyring => Session::restore(&store, &KeyringVault)?,
        };
        let mut ctx = Self {
            config,
            tracker: WellnessTracker::new(store, session),
        };
        ctx.tracker.roll_over(&habit_day_label(Utc::now()));

        if ctx.tracker.session().is_authenticated() {
            if let Err(SessionError::TokenExpired) = ctx.tracker.session_mut().ensure_token_fresh(Utc::now()) {
                eprintln!("Your session has expired. Please log in again.");
                ctx.save_session()?;
            }
        }
        Ok(ctx)
    }

    pub fn session(&self) -> &Session {
        self.tracker.session()
    }

    pub fn session_mut(&mut self) -> &mut Session {
        self.tracker.session_mut()
    }

    /// Write the session through the configured token storage.
    pub fn save_session(&self) -> Result<(), StoreError> {
        match self.config.session.token_storage {
            TokenStorage::Local => self
                .tracker
                .persist_session(&LocalTokenVault::new(self.tracker.store())),
            TokenStorage::Keyring => self.tracker.persist_session(&KeyringVault),
        }
    }

    /// API client carrying the session token, if any.
    pub fn api(&self) -> CliResult<ApiClient> {
        let client = ApiClient::from_config(&self.config)?;
        Ok(client.with_token(self.session().token().map(str::to_string)))
    }

    /// API client for endpoints that need a login.
    pub fn authed_api(&self) -> CliResult<ApiClient> {
        if !self.session().is_authenticated() {
            return Err(SessionError::NotAuthenticated.into());
        }
        self.api()
    }
}

/// Run a gateway future to completion.
pub fn block_on<F: Future>(fut: F) -> CliResult<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create runtime: {e}"))?;
    Ok(rt.block_on(fut))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
