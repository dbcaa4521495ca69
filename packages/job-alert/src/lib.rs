// Job Alert - scheduled job board search with new-job alerts
//
// Sources are searched on a schedule; postings already reported within the
// retention window are suppressed via the job_tracker history, and whatever
// is new is saved, rendered and sent to the notification relay.

pub mod collect;
pub mod config;
pub mod cycle_lock;
pub mod error;
pub mod notifier;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod server;
pub mod sources;
pub mod testing;

pub use config::*;
pub use error::{CycleError, SourceError};
pub use pipeline::{
    force_sweep, run_search_cycle, search_once, CycleOutcome, SearchContext, SearchOutcome,
    SearchParams,
};
