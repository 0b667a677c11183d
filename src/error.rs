//! Error types for profile-gate.

use crate::profile::ProfileField;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Unknown notification preference: {0}")]
    UnknownPreference(String),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Raised by `MemoryStore` fault injection.
    #[error("Injected failure for key {0}")]
    Injected(String),
}

/// A required form field was left empty on submit.
///
/// The display text is the body of the alert shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{label} is required.")]
pub struct ValidationError {
    pub field: ProfileField,
    pub label: String,
}

/// State machine errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Cannot {operation} while in state {from}")]
    InvalidTransition {
        from: String,
        operation: &'static str,
    },
}

/// Result type alias for profile-gate.
pub type Result<T> = std::result::Result<T, Error>;
