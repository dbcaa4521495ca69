//! Seen-job tracking core for the job alert pipeline.
//!
//! Raw records from job board scrapers flow through this crate in order:
//!
//! ```text
//! RawJobRecord ─► normalizer ─► reconcile ─► FilterChain ─► select_new ─► new jobs
//!                                                              │
//!                                                        HistoryStore ◄─► HistoryStorage
//!                                                              │
//!                                                            sweep
//! ```
//!
//! Identity is the [`Fingerprint`] of (title, company, location). URLs,
//! salaries and descriptions differ between boards for the same posting and
//! never take part in deduplication.
//!
//! # Modules
//!
//! - [`types`] - raw and normalized records, source names, fingerprints
//! - [`normalizer`] - raw record → [`JobRecord`]
//! - [`fingerprint`] - stable identity digest
//! - [`filters`] - location / seniority / salary heuristics
//! - [`reconcile`] - cross-source deduplication within one run
//! - [`history`] - persisted seen-job state
//! - [`selector`] - new vs. already-seen split with a retention window
//! - [`sweeper`] - bulk expiry of old history entries
//! - [`storage`] - file and in-memory persistence

pub mod config;
pub mod error;
pub mod filters;
pub mod fingerprint;
pub mod history;
pub mod normalizer;
pub mod reconcile;
pub mod selector;
pub mod storage;
pub mod sweeper;
pub mod types;

mod timestamp;

pub use config::{FilterConfig, TrackerConfig};
pub use error::{Result, TrackerError};
pub use filters::{FilterChain, JobFilter, LocationFilter, SalaryFilter, SeniorityFilter};
pub use fingerprint::fingerprint;
pub use history::{HistoryStats, HistoryStore};
pub use normalizer::{normalize, normalize_batch, RawBatch};
pub use reconcile::reconcile;
pub use selector::{select_new, select_new_at};
pub use storage::{HistoryStorage, JsonFileStorage, MemoryStorage};
pub use sweeper::{sweep, sweep_at, sweep_due, SweepStats};
pub use types::{Fingerprint, JobRecord, RawJobRecord, SourceKind, SourceName};
