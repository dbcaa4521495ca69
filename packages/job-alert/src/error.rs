use std::path::PathBuf;

use thiserror::Error;

/// Failure fetching from a single job source. Never fatal to a cycle.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid search url {0}")]
    InvalidUrl(String),

    #[error("invalid {field} selector {selector:?} for {board}")]
    Selector {
        board: String,
        field: &'static str,
        selector: String,
    },

    #[error("failed to read feed {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed {location} is not a JSON array of job records: {source}")]
    Feed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a guarded search cycle did not complete
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("a search cycle is already running{}", holder_suffix(.pid))]
    AlreadyRunning { pid: Option<u32> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn holder_suffix(pid: &Option<u32>) -> String {
    pid.map(|pid| format!(" (pid {pid})")).unwrap_or_default()
}
