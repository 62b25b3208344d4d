pub mod config;
pub mod local_store;

pub use config::Config;
pub use local_store::{keys, LocalStore, StoreBatch, DEFAULT_QUOTA_BYTES};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/mindwell[-dev]/` based on MINDWELL_ENV.
///
/// Set MINDWELL_ENV=dev to use the development data directory, or
/// MINDWELL_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MINDWELL_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MINDWELL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("mindwell-dev")
            } else {
                base_dir.join("mindwell")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
