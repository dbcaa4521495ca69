//! Persistence for [`HistoryStore`].
//!
//! The store is read once at the start of a cycle and written once at the
//! end as a whole document.

mod json_file;
mod memory;

pub use json_file::{JsonFileStorage, HISTORY_FILE_NAME};
pub use memory::MemoryStorage;

use tracing::warn;

use crate::error::Result;
use crate::history::HistoryStore;

/// Load and save the seen-job history
pub trait HistoryStorage: Send + Sync {
    /// Load the persisted history. A missing document is an empty history.
    fn load(&self) -> Result<HistoryStore>;

    /// Replace the persisted history with `store`.
    fn save(&self, store: &HistoryStore) -> Result<()>;

    /// Load, or start fresh when the document is unreadable or corrupt.
    ///
    /// Starting fresh re-notifies previously seen postings once.
    fn load_or_default(&self) -> HistoryStore {
        match self.load() {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Failed to load job history, starting fresh");
                HistoryStore::new()
            }
        }
    }
}
