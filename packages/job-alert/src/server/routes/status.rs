use axum::{extract::Extension, Json};
use chrono::{DateTime, Local};
use job_tracker::HistoryStats;
use serde::Serialize;
use tracing::warn;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    status: String,
    scheduler_active: bool,
    cycle_running: bool,
    search_configuration: SearchConfiguration,
    /// Date of the latest saved results, `None` before the first search
    last_search: Option<DateTime<Local>>,
    total_saved_searches: usize,
    history: HistoryStats,
}

#[derive(Serialize)]
pub struct SearchConfiguration {
    min_salary_lpa: f64,
    job_titles: Vec<String>,
    location: String,
    preferred_locations: Vec<String>,
    experience_levels: Vec<String>,
    max_experience_years: u32,
    retention_days: u32,
}

/// System status
pub async fn status_handler(Extension(state): Extension<AppState>) -> Json<StatusResponse> {
    let ctx = &state.ctx;
    let config = &ctx.config;

    let last_search = ctx
        .reports
        .load_latest_jobs()
        .map(|saved| saved.search_date)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read latest results");
            None
        });
    let total_saved_searches = ctx.reports.saved_search_count().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to count saved searches");
        0
    });

    Json(StatusResponse {
        status: "running".to_string(),
        scheduler_active: ctx.scheduler_active(),
        cycle_running: ctx.is_cycle_running(),
        search_configuration: SearchConfiguration {
            min_salary_lpa: config.min_salary_lpa,
            job_titles: config.job_titles.clone(),
            location: config.location.clone(),
            preferred_locations: config.preferred_locations.clone(),
            experience_levels: config.experience_levels.clone(),
            max_experience_years: config.max_experience_years,
            retention_days: config.retention_days,
        },
        last_search,
        total_saved_searches,
        history: ctx.history_stats(),
    })
}
