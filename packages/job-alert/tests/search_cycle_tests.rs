//! Full search cycles against mock sources and a temporary storage dir.

use std::collections::HashMap;
use std::sync::Arc;

use job_alert_core::cycle_lock::CycleLock;
use job_alert_core::sources::JobSource;
use job_alert_core::testing::{MockJobSource, MockNotifier};
use job_alert_core::{
    force_sweep, run_search_cycle, search_once, Config, CycleError, SearchContext, SearchParams,
};
use job_tracker::{
    HistoryStorage, HistoryStore, JsonFileStorage, MemoryStorage, RawJobRecord, Result as TrackerResult,
    SourceName, TrackerError,
};
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> Config {
    let vars: HashMap<&str, String> = [
        ("STORAGE_DIR", dir.path().display().to_string()),
        ("JOB_TITLES", "operations".to_string()),
        ("LOCATION", "Gurugram".to_string()),
        ("REQUEST_DELAY_MS", "0".to_string()),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn board_records() -> Vec<RawJobRecord> {
    vec![
        RawJobRecord::new("Operations Coordinator", "Acme").with_location("Gurugram"),
        RawJobRecord::new("", "Beta"),
    ]
}

fn context(dir: &TempDir, sources: Vec<Arc<dyn JobSource>>) -> (SearchContext, Arc<MockNotifier>) {
    let config = test_config(dir);
    let storage = Arc::new(JsonFileStorage::in_dir(&config.storage_dir));
    let notifier = Arc::new(MockNotifier::new());
    let ctx = SearchContext::new(config, sources, storage, Some(notifier.clone()));
    (ctx, notifier)
}

#[tokio::test]
async fn second_cycle_same_day_reports_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let source: Arc<dyn JobSource> =
        Arc::new(MockJobSource::new(SourceName::Naukri).with_records(board_records()));
    let (ctx, notifier) = context(&dir, vec![source]);

    let first = run_search_cycle(&ctx).await.unwrap();
    assert_eq!(first.collected, 2);
    assert_eq!(first.normalized, 1);
    assert_eq!(first.filtered, 1);
    assert_eq!(first.new_jobs.len(), 1);
    assert_eq!(first.new_jobs[0].title, "Operations Coordinator");
    assert!(first.history_saved);
    assert!(first.report_file.is_some());

    let second = run_search_cycle(&ctx).await.unwrap();
    assert_eq!(second.filtered, 1);
    assert!(second.new_jobs.is_empty());
    assert!(second.report_file.is_none());

    let store = ctx.storage.load().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.stats().recent_daily_counts.values().sum::<u32>(), 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].len(), 1);
    assert!(sent[1].is_empty());

    // Cycles finishing in the same millisecond share a results file
    assert!(ctx.reports.saved_search_count().unwrap() >= 1);
}

#[tokio::test]
async fn failing_source_does_not_stop_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(MockJobSource::failing(SourceName::Indeed)),
        Arc::new(MockJobSource::new(SourceName::Shine).with_records(board_records())),
    ];
    let (ctx, _) = context(&dir, sources);

    let outcome = run_search_cycle(&ctx).await.unwrap();
    assert_eq!(outcome.new_jobs.len(), 1);
}

#[tokio::test]
async fn same_posting_on_two_boards_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(MockJobSource::new(SourceName::Naukri).with_records(board_records())),
        Arc::new(
            MockJobSource::new(SourceName::Indeed).with_records(vec![RawJobRecord::new(
                "operations coordinator",
                "ACME",
            )
            .with_location("gurugram")]),
        ),
    ];
    let (ctx, _) = context(&dir, sources);

    let outcome = run_search_cycle(&ctx).await.unwrap();
    assert_eq!(outcome.normalized, 2);
    assert_eq!(outcome.new_jobs.len(), 1);
    assert_eq!(outcome.new_jobs[0].source_name, SourceName::Naukri);
}

#[tokio::test]
async fn held_lock_rejects_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, notifier) = context(&dir, Vec::new());

    let lock = CycleLock::acquire(dir.path()).unwrap();
    let err = run_search_cycle(&ctx).await.unwrap_err();
    assert!(matches!(err, CycleError::AlreadyRunning { .. }));
    assert!(notifier.sent().is_empty());

    drop(lock);
    assert!(run_search_cycle(&ctx).await.is_ok());
}

struct ReadOnlyStorage(MemoryStorage);

impl HistoryStorage for ReadOnlyStorage {
    fn load(&self) -> TrackerResult<HistoryStore> {
        self.0.load()
    }

    fn save(&self, _store: &HistoryStore) -> TrackerResult<()> {
        Err(TrackerError::InvalidConfig("read-only".to_string()))
    }
}

#[tokio::test]
async fn history_save_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let source: Arc<dyn JobSource> =
        Arc::new(MockJobSource::new(SourceName::Naukri).with_records(board_records()));
    let ctx = SearchContext::new(
        config,
        vec![source],
        Arc::new(ReadOnlyStorage(MemoryStorage::new())),
        None,
    );

    let outcome = run_search_cycle(&ctx).await.unwrap();
    assert!(!outcome.history_saved);
    assert_eq!(outcome.new_jobs.len(), 1);
    assert!(outcome.results_file.is_some());
}

#[tokio::test]
async fn manual_search_leaves_history_alone() {
    let dir = tempfile::tempdir().unwrap();
    let source: Arc<dyn JobSource> =
        Arc::new(MockJobSource::new(SourceName::Naukri).with_records(board_records()));
    let (ctx, notifier) = context(&dir, vec![source]);

    let params = SearchParams::from_config(&ctx.config);
    let outcome = search_once(&ctx, &params).await.unwrap();

    assert_eq!(outcome.total_jobs, 1);
    assert_eq!(outcome.filtered_jobs, 1);
    assert!(outcome.report_file.is_some());
    assert!(ctx.storage.load().unwrap().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn forced_sweep_stamps_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let source: Arc<dyn JobSource> =
        Arc::new(MockJobSource::new(SourceName::Naukri).with_records(board_records()));
    let (ctx, _) = context(&dir, vec![source]);
    run_search_cycle(&ctx).await.unwrap();

    let stats = force_sweep(&ctx, 30).await.unwrap();

    assert_eq!(stats.total(), 0);
    assert_eq!(ctx.storage.load().unwrap().len(), 1);
}
