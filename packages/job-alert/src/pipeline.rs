//! One search cycle, end to end.
//!
//! ```text
//! collect ─► normalize ─► reconcile ─► filters ─► select_new ─► save history
//!                                                     │
//!                                      results file, HTML report, notification
//! ```
//!
//! Everything a cycle needs lives in [`SearchContext`]; there is no global
//! state. The guarded cycle holds both an in-process mutex and the on-disk
//! [`CycleLock`], so at most one cycle touches the history at a time.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use job_tracker::{
    normalize_batch, reconcile, select_new, sweep, sweep_due, FilterChain, HistoryStats,
    HistoryStorage, JobRecord, JsonFileStorage, SweepStats,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::collect::collect_jobs;
use crate::config::Config;
use crate::cycle_lock::CycleLock;
use crate::error::CycleError;
use crate::notifier::{Notifier, WebhookNotifier};
use crate::report::ReportWriter;
use crate::sources::{JobSource, SourcesFile};

/// Shared per-process state for search cycles
pub struct SearchContext {
    pub config: Config,
    pub sources: Vec<Arc<dyn JobSource>>,
    pub storage: Arc<dyn HistoryStorage>,
    pub reports: ReportWriter,
    pub notifier: Option<Arc<dyn Notifier>>,
    cycle_guard: Mutex<()>,
    scheduler_active: AtomicBool,
}

impl SearchContext {
    pub fn new(
        config: Config,
        sources: Vec<Arc<dyn JobSource>>,
        storage: Arc<dyn HistoryStorage>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        let reports = ReportWriter::new(config.storage_dir.clone());
        Self {
            config,
            sources,
            storage,
            reports,
            notifier,
            cycle_guard: Mutex::new(()),
            scheduler_active: AtomicBool::new(false),
        }
    }

    /// Sources from `SOURCES_FILE` (or the built-in boards), file storage and
    /// the webhook notifier when configured.
    pub fn from_config(config: Config) -> Result<Self> {
        let sources_file = match &config.sources_file {
            Some(path) => SourcesFile::load(path)?,
            None => SourcesFile::builtin(),
        };
        let sources = sources_file.build().context("Failed to build job sources")?;
        let storage = Arc::new(JsonFileStorage::in_dir(&config.storage_dir));
        let notifier = WebhookNotifier::from_config(&config)?
            .map(|n| Arc::new(n) as Arc<dyn Notifier>);

        info!(
            sources = sources.len(),
            storage = %storage.path().display(),
            notifications = notifier.is_some(),
            "Search context ready"
        );

        Ok(Self::new(config, sources, storage, notifier))
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_guard.try_lock().is_err()
    }

    pub fn scheduler_active(&self) -> bool {
        self.scheduler_active.load(Ordering::Relaxed)
    }

    pub fn set_scheduler_active(&self, active: bool) {
        self.scheduler_active.store(active, Ordering::Relaxed);
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.storage.load_or_default().stats()
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.request_delay_ms)
    }
}

/// What a guarded cycle did
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Raw records returned by all sources
    pub collected: usize,
    /// Records left after normalization
    pub normalized: usize,
    /// Records left after reconciliation and filtering
    pub filtered: usize,
    pub new_jobs: Vec<JobRecord>,
    pub history_saved: bool,
    pub swept: Option<SweepStats>,
    pub results_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
}

/// Overrides for a manual search
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub keywords: Vec<String>,
    pub location: String,
    pub min_salary_lpa: f64,
}

impl SearchParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keywords: config.job_titles.clone(),
            location: config.location.clone(),
            min_salary_lpa: config.min_salary_lpa,
        }
    }
}

/// Result of a manual search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub total_jobs: usize,
    pub filtered_jobs: usize,
    pub jobs: Vec<JobRecord>,
    pub search_date: DateTime<Local>,
    pub report_file: Option<PathBuf>,
}

struct Gathered {
    collected: usize,
    normalized: usize,
    jobs: Vec<JobRecord>,
}

async fn gather(ctx: &SearchContext, params: &SearchParams) -> Gathered {
    let batches = collect_jobs(
        &ctx.sources,
        &params.keywords,
        &params.location,
        ctx.config.max_keywords,
        ctx.request_delay(),
    )
    .await;

    let collected = batches.iter().map(|b| b.records.len()).sum();
    let normalized: Vec<JobRecord> = batches.into_iter().flat_map(normalize_batch).collect();
    let normalized_count = normalized.len();

    let filters = ctx
        .config
        .filter_config()
        .with_min_salary_lpa(params.min_salary_lpa);
    let jobs = FilterChain::from_config(&filters).apply(reconcile(normalized));

    Gathered {
        collected,
        normalized: normalized_count,
        jobs,
    }
}

/// Run one guarded search cycle.
///
/// Returns [`CycleError::AlreadyRunning`] when another cycle holds the
/// in-process guard or the storage directory's lock file.
pub async fn run_search_cycle(ctx: &SearchContext) -> Result<CycleOutcome, CycleError> {
    let _guard = ctx
        .cycle_guard
        .try_lock()
        .map_err(|_| CycleError::AlreadyRunning {
            pid: Some(std::process::id()),
        })?;
    let _lock = CycleLock::acquire(&ctx.config.storage_dir)?;

    let cycle_id = Uuid::new_v4();
    run_cycle(ctx, cycle_id)
        .instrument(info_span!("search_cycle", %cycle_id))
        .await
}

async fn run_cycle(ctx: &SearchContext, cycle_id: Uuid) -> Result<CycleOutcome, CycleError> {
    let started_at = Utc::now();
    info!("Starting job search cycle");

    let params = SearchParams::from_config(&ctx.config);
    let gathered = gather(ctx, &params).await;

    let tracker = ctx.config.tracker_config();
    let mut store = ctx.storage.load_or_default();
    let new_jobs = select_new(gathered.jobs.clone(), tracker.retention_days, &mut store);
    store.record_daily_count(new_jobs.len() as u32);

    let swept = if sweep_due(&store, tracker.sweep_weekday, Utc::now()) {
        Some(sweep(&mut store, tracker.max_age_days))
    } else {
        None
    };

    let history_saved = match ctx.storage.save(&store) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Failed to save job history, next cycle may re-notify");
            false
        }
    };

    let results_file = ctx.reports.save_jobs(&new_jobs)?;
    let report_file = if new_jobs.is_empty() {
        None
    } else {
        Some(ctx.reports.create_html_report(&new_jobs)?)
    };

    if let Some(notifier) = &ctx.notifier {
        if let Err(e) = notifier.notify(&new_jobs).await {
            warn!(error = %e, "Failed to send job notification");
        }
    }

    info!(
        collected = gathered.collected,
        normalized = gathered.normalized,
        filtered = gathered.jobs.len(),
        new = new_jobs.len(),
        history_saved,
        "Job search cycle complete"
    );

    Ok(CycleOutcome {
        cycle_id,
        started_at,
        collected: gathered.collected,
        normalized: gathered.normalized,
        filtered: gathered.jobs.len(),
        new_jobs,
        history_saved,
        swept,
        results_file: Some(results_file),
        report_file,
    })
}

/// Search, filter and save results without touching the history.
pub async fn search_once(ctx: &SearchContext, params: &SearchParams) -> Result<SearchOutcome> {
    info!(
        keywords = params.keywords.len(),
        location = %params.location,
        min_salary_lpa = params.min_salary_lpa,
        "Running manual job search"
    );

    let gathered = gather(ctx, params).await;

    ctx.reports.save_jobs(&gathered.jobs)?;
    let report_file = if gathered.jobs.is_empty() {
        None
    } else {
        Some(ctx.reports.create_html_report(&gathered.jobs)?)
    };

    Ok(SearchOutcome {
        total_jobs: gathered.normalized,
        filtered_jobs: gathered.jobs.len(),
        jobs: gathered.jobs,
        search_date: Local::now(),
        report_file,
    })
}

/// Sweep the history now, regardless of the weekday.
pub async fn force_sweep(ctx: &SearchContext, max_age_days: u32) -> Result<SweepStats, CycleError> {
    let _guard = ctx
        .cycle_guard
        .try_lock()
        .map_err(|_| CycleError::AlreadyRunning {
            pid: Some(std::process::id()),
        })?;
    let _lock = CycleLock::acquire(&ctx.config.storage_dir)?;

    let mut store = ctx.storage.load_or_default();
    let stats = sweep(&mut store, max_age_days);
    ctx.storage
        .save(&store)
        .context("Failed to save job history after sweep")?;

    Ok(stats)
}
