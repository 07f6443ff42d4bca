//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection mutex was poisoned by a panicking query.
    #[error("connection lock poisoned: {0}")]
    Poisoned(String),

    /// Blocking task failed to complete.
    #[error("store task failed: {0}")]
    Task(String),

    /// The database lacks a table or column the store reads.
    #[error("incompatible schema: {0}")]
    Schema(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
