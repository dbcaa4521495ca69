use std::sync::RwLock;

use super::HistoryStorage;
use crate::error::Result;
use crate::history::HistoryStore;

/// In-process history, for tests and one-off runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: RwLock<Option<HistoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: HistoryStore) -> Self {
        Self {
            store: RwLock::new(Some(store)),
        }
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<HistoryStore> {
        let guard = self.store.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, store: &HistoryStore) -> Result<()> {
        let mut guard = self.store.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(store.clone());
        Ok(())
    }
}
