// Mock sources and notifiers for tests.
//
// Public so integration tests can build a SearchContext without network access.

use async_trait::async_trait;
use job_tracker::{JobRecord, RawJobRecord, SourceKind, SourceName};
use std::sync::{Arc, Mutex};

use crate::error::SourceError;
use crate::notifier::Notifier;
use crate::sources::JobSource;

// =============================================================================
// Mock Job Source
// =============================================================================

/// Returns the same records for every search and records each call
pub struct MockJobSource {
    name: SourceName,
    kind: SourceKind,
    records: Vec<RawJobRecord>,
    fail: bool,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockJobSource {
    pub fn new(name: SourceName) -> Self {
        Self {
            name,
            kind: SourceKind::Raw,
            records: Vec::new(),
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A source whose every fetch fails
    pub fn failing(name: SourceName) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_records(mut self, records: Vec<RawJobRecord>) -> Self {
        self.records = records;
        self
    }

    /// (keyword, location) of every fetch so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for MockJobSource {
    fn name(&self) -> &SourceName {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, keyword: &str, location: &str) -> Result<Vec<RawJobRecord>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((keyword.to_string(), location.to_string()));

        if self.fail {
            return Err(SourceError::InvalidUrl(format!(
                "mock://{}/{keyword}",
                self.name
            )));
        }
        Ok(self.records.clone())
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

/// Captures every notification instead of delivering it
#[derive(Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Vec<JobRecord>>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Vec<JobRecord>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, jobs: &[JobRecord]) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(jobs.to_vec());
        Ok(())
    }
}
