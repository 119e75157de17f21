//! Error types for the local store.

use thiserror::Error;

/// Errors that can occur while opening or querying the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected a statement or the connection failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The data directory could not be prepared
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk schema differs from the declared one and the
    /// migration policy forbids recreating it
    #[error("Schema version mismatch: found {found}, expected {expected}")]
    SchemaMismatch { found: i32, expected: i32 },

    /// A blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    Join(String),

    /// A day name outside the seven the timetable uses
    #[error("Unknown day name: {0}")]
    InvalidDay(String),

    /// The connection mutex was poisoned by a panicking writer
    #[error("Store connection lock poisoned")]
    Poisoned,
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Join(err.to_string())
    }
}
