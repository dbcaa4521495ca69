//! At most one search cycle per storage directory.
//!
//! Scheduler triggers, the HTTP trigger and CLI runs may overlap; the cycle
//! lock file makes the second one back off instead of racing on the history
//! file.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::CycleError;

pub const LOCK_FILE_NAME: &str = ".search.lock";

/// A lock this old belongs to a process that died mid-cycle.
const STALE_AFTER_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockHolder {
    pid: u32,
    started_at: DateTime<Utc>,
}

/// Held for the duration of a cycle; the lock file is removed on drop.
#[derive(Debug)]
pub struct CycleLock {
    path: PathBuf,
}

impl CycleLock {
    pub fn acquire(dir: &Path) -> Result<Self, CycleError> {
        Self::acquire_at(dir, Utc::now())
    }

    pub fn acquire_at(dir: &Path, now: DateTime<Utc>) -> Result<Self, CycleError> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create storage dir {}", dir.display()))?;
        let path = dir.join(LOCK_FILE_NAME);

        match Self::create(&path, now) {
            Ok(lock) => return Ok(lock),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to create lock file {}", path.display()))
                    .into())
            }
        }

        let holder = read_holder(&path);
        let started_at = holder
            .as_ref()
            .map(|h| h.started_at)
            .or_else(|| modified_at(&path));

        match started_at {
            Some(started) if now - started < Duration::hours(STALE_AFTER_HOURS) => {
                return Err(CycleError::AlreadyRunning {
                    pid: holder.map(|h| h.pid),
                });
            }
            _ => {
                warn!(
                    path = %path.display(),
                    pid = holder.as_ref().map(|h| h.pid),
                    "Replacing stale search lock"
                );
            }
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to remove stale lock {}", path.display()))
                    .into())
            }
        }

        // Another process may have replaced the stale lock first
        Self::create(&path, now).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => CycleError::AlreadyRunning { pid: None },
            _ => anyhow::Error::new(e)
                .context(format!("Failed to create lock file {}", path.display()))
                .into(),
        })
    }

    fn create(path: &Path, now: DateTime<Utc>) -> io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let lock = Self {
            path: path.to_path_buf(),
        };

        let holder = LockHolder {
            pid: std::process::id(),
            started_at: now,
        };
        let body = serde_json::to_vec(&holder).map_err(io::Error::other)?;
        file.write_all(&body)?;

        debug!(path = %path.display(), "Acquired search lock");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release search lock");
        } else {
            debug!(path = %self.path.display(), "Released search lock");
        }
    }
}

fn read_holder(path: &Path) -> Option<LockHolder> {
    let contents = fs::read(path).ok()?;
    serde_json::from_slice(&contents).ok()
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
