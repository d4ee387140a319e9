//! Core error types for mealstreak-core.
//!
//! This module defines the error hierarchy using thiserror. Note that
//! "already completed" is deliberately absent: re-marking a completed
//! meal or day is an idempotent no-op, not a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mealstreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Redemption rejected because the balance cannot cover the cost
    #[error("Not enough tokens: need {cost}, have {balance}")]
    InsufficientBalance { cost: u64, balance: f64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Persisted ledger document could not be decoded
    #[error("Corrupt ledger document: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// IO failure while preparing the data directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Unknown or malformed configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors raised at the input boundary.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Unrecognized day-of-week name
    #[error("Invalid day of week: '{0}'")]
    UnknownDay(String),

    /// Unrecognized meal slot name
    #[error("Invalid meal slot: '{0}'")]
    UnknownMealSlot(String),

    /// Unrecognized redemption type
    #[error("Invalid redemption type: '{0}'")]
    UnknownRedemptionType(String),

    /// Illegal consult status transition
    #[error("Cannot move consultation from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    /// Missing or malformed field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
