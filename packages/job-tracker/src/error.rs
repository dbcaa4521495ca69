//! Typed errors for the job tracker.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting or configuring the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Reading or writing a history file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// History file exists but does not parse
    #[error("corrupt history file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tracker or filter settings are inconsistent
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
