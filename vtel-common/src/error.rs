//! Common error types for VTEL

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for VTEL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across VTEL services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate business key
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid caller input (pagination bounds, export format, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fatal ingestion error; aborts the whole run
    #[error("Ingestion failed for {}: {reason}", path.display())]
    Ingestion { path: PathBuf, reason: String },

    /// Export file could not be produced
    #[error("Export error: {0}")]
    Export(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an ingestion error for `path`
    pub fn ingestion(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Ingestion {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify a failed write.
    ///
    /// Unique violations become [`Error::Conflict`] and foreign key violations
    /// become [`Error::Validation`]; everything else stays a database error.
    pub fn from_write(err: sqlx::Error, context: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Error::Conflict(format!("{}: {}", context, db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return Error::Validation(format!("{}: {}", context, db_err.message()));
            }
        }
        Error::Database(err)
    }
}
