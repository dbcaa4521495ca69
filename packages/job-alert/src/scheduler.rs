//! Scheduled search cycles using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler
//!     ├─► daily at DAILY_RUN_TIME (local) ──┐
//!     └─► every RUN_INTERVAL_MINUTES ───────┴─► run_search_cycle (guarded)
//! ```
//!
//! Overlapping triggers are skipped by the cycle guard rather than queued.

use anyhow::Result;
use chrono::{Local, NaiveTime, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::CycleError;
use crate::pipeline::{run_search_cycle, SearchContext};

/// Six-field cron expression firing every day at `time`
pub fn daily_cron(time: NaiveTime) -> String {
    format!("0 {} {} * * *", time.minute(), time.hour())
}

/// Start the daily trigger and, when configured, the interval trigger
pub async fn start_scheduler(ctx: Arc<SearchContext>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let daily_ctx = ctx.clone();
    let daily_job = Job::new_async_tz(
        daily_cron(ctx.config.daily_run_time).as_str(),
        Local,
        move |_uuid, _lock| {
            let ctx = daily_ctx.clone();
            Box::pin(async move {
                run_triggered_cycle(&ctx, "daily").await;
            })
        },
    )?;
    scheduler.add(daily_job).await?;

    let interval = ctx.config.run_interval_minutes;
    if interval > 0 {
        let interval_ctx = ctx.clone();
        let interval_job = Job::new_repeated_async(
            Duration::from_secs(interval * 60),
            move |_uuid, _lock| {
                let ctx = interval_ctx.clone();
                Box::pin(async move {
                    run_triggered_cycle(&ctx, "interval").await;
                })
            },
        )?;
        scheduler.add(interval_job).await?;
    }

    scheduler.start().await?;
    ctx.set_scheduler_active(true);

    info!(
        daily_at = %ctx.config.daily_run_time.format("%H:%M"),
        interval_minutes = interval,
        "Scheduled searches started"
    );
    Ok(scheduler)
}

pub async fn stop_scheduler(mut scheduler: JobScheduler, ctx: &SearchContext) -> Result<()> {
    scheduler.shutdown().await?;
    ctx.set_scheduler_active(false);
    info!("Scheduled searches stopped");
    Ok(())
}

/// Run a guarded cycle from a background trigger, logging the outcome.
pub async fn run_triggered_cycle(ctx: &SearchContext, trigger: &'static str) {
    match run_search_cycle(ctx).await {
        Ok(outcome) => info!(
            trigger,
            cycle_id = %outcome.cycle_id,
            new = outcome.new_jobs.len(),
            "Triggered search finished"
        ),
        Err(CycleError::AlreadyRunning { pid }) => {
            info!(trigger, holder = ?pid, "Search already running, skipping trigger")
        }
        Err(e) => error!(trigger, error = %e, "Triggered search failed"),
    }
}
