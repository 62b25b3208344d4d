//! Where the bearer token lives between runs.

use crate::error::StoreError;
use crate::storage::{keys, LocalStore};

/// Storage for the session token.
pub trait TokenVault {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn store(&self, token: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Token kept in the local store next to the rest of the session.
pub struct LocalTokenVault<'a> {
    store: &'a LocalStore,
}

impl<'a> LocalTokenVault<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }
}

impl TokenVault for LocalTokenVault<'_> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .kv_get(keys::AUTH_TOKEN)?
            .filter(|t| !t.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StoreError> {
        self.store.kv_set(keys::AUTH_TOKEN, token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.store.kv_remove(keys::AUTH_TOKEN)
    }
}

/// Token kept in the OS keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringVault;

impl TokenVault for KeyringVault {
    fn load(&self) -> Result<Option<String>, StoreError> {
        keyring_store::get(keys::AUTH_TOKEN)
    }

    fn store(&self, token: &str) -> Result<(), StoreError> {
        keyring_store::set(keys::AUTH_TOKEN, token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        keyring_store::delete(keys::AUTH_TOKEN)
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::StoreError;

    const SERVICE: &str = "mindwell";

    fn entry(key: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(SERVICE, key).map_err(|e| StoreError::Keyring(e.to_string()))
    }

    pub fn get(key: &str) -> Result<Option<String>, StoreError> {
        match entry(key)?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Keyring(e.to_string())),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), StoreError> {
        entry(key)?
            .set_password(value)
            .map_err(|e| StoreError::Keyring(e.to_string()))
    }

    pub fn delete(key: &str) -> Result<(), StoreError> {
        match entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Keyring(e.to_string())),
        }
    }
}
