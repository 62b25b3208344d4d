//! Core error types for mindwell-core.
//!
//! Each concern has its own `thiserror` enum; `CoreError` unifies them for
//! callers that drive several components at once (the CLI, the tracker).
//! No error is retried automatically anywhere in the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mindwell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote API errors
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Premium gate refusals
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Writing the value would exceed the storage quota
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Stored value could not be encoded or decoded
    #[error("Serialization failed for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The OS keyring refused a credential operation
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Remote gateway errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Bad credentials, rejected registration, or an expired/invalid token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Login refused until the account's email address is verified
    #[error("Email address {email} must be verified before logging in")]
    EmailNotVerified { email: String },

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The backend rejected payment verification. The charge may have
    /// succeeded; the user is directed to support.
    #[error("Payment {reference} could not be verified ({message}); you may have been charged, please contact support")]
    PaymentVerification { reference: String, message: String },

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The configured base URL cannot be joined with an endpoint
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Session state machine errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The requested transition is not allowed from the current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    /// The cached bearer token has expired
    #[error("Session token expired; please log in again")]
    TokenExpired,

    /// The operation needs a logged-in user
    #[error("Not logged in")]
    NotAuthenticated,
}

/// Premium gate refusals.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GateError {
    #[error("{feature} requires a Premium plan")]
    PremiumRequired { feature: String },

    #[error("Free plan allows at most {limit} {what}; upgrade to Premium for more")]
    LimitReached { what: String, limit: usize },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field left empty
    #[error("'{0}' is required")]
    Required(String),

    /// Value outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Text longer than allowed
    #[error("'{field}' must be at most {max} characters (got {len})")]
    TooLong { field: String, max: usize, len: usize },

    /// Referenced record does not exist
    #[error("No {kind} with id '{id}'")]
    NotFound { kind: String, id: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode {
                endpoint: err.url().map(|u| u.path().to_string()).unwrap_or_default(),
                message: err.to_string(),
            }
        } else {
            GatewayError::Network(err)
        }
    }
}

impl GatewayError {
    /// True when the failure happened before any HTTP response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout { .. })
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_error_mentions_support() {
        let err = GatewayError::PaymentVerification {
            reference: "ref-1".into(),
            message: "Payment verification failed".into(),
        };
        let text = err.to_string();
        assert!(text.contains("ref-1"));
        assert!(text.contains("contact support"));
    }

    #[test]
    fn timeout_is_transport() {
        assert!(GatewayError::Timeout { timeout_ms: 10 }.is_transport());
        assert!(!GatewayError::Auth("nope".into()).is_transport());
    }

    #[test]
    fn gate_error_wraps_into_core() {
        let err: CoreError = GateError::LimitReached {
            what: "habits".into(),
            limit: 5,
        }
        .into();
        assert!(err.to_string().contains("at most 5 habits"));
    }
}
