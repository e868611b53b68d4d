//! Unified application error type.
//! All modules (db, schedule, report, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Schedule collaborators
    // ---------------------------
    /// The schedule query for a queue could not produce a rowset.
    #[error("Failed to fetch schedule '{queue}': {reason}")]
    Fetch { queue: String, reason: String },

    /// A commit or row action did not reach the data store.
    #[error("Write failed for job {job}: {reason}")]
    Write { job: String, reason: String },

    #[error("Malformed schedule rowset: {0}")]
    MalformedRowset(String),

    #[error("Invalid priority '{value}' for job {job}")]
    InvalidPriority { job: String, value: String },

    #[error("Job not found: {0}")]
    NotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required local setting (e.g. the prints directory) is unset.
    #[error("Missing configuration value: {0}")]
    ConfigurationMissing(String),

    // ---------------------------
    // Report errors
    // ---------------------------
    #[error("Report error: {0}")]
    Report(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Wrap any failure raised while writing on behalf of `job`.
    pub fn write(job: &str, err: impl std::fmt::Display) -> Self {
        AppError::Write {
            job: job.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn fetch(queue: &str, err: impl std::fmt::Display) -> Self {
        AppError::Fetch {
            queue: queue.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
