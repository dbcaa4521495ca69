use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use job_tracker::JobRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

use super::error_response;
use crate::pipeline::{search_once, SearchParams};
use crate::scheduler::run_triggered_cycle;
use crate::server::app::AppState;

/// Jobs returned inline by a manual search
const SEARCH_RESPONSE_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub keywords: Option<Vec<String>>,
    pub min_salary_lpa: Option<f64>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total_jobs: usize,
    pub filtered_jobs: usize,
    pub jobs: Vec<JobRecord>,
    pub search_date: String,
    pub report_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub message: String,
    pub status: String,
}

/// Manual search with optional overrides. Does not touch the job history.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<SearchRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let mut params = SearchParams::from_config(&state.ctx.config);
    if let Some(keywords) = request.keywords.filter(|k| !k.is_empty()) {
        params.keywords = keywords;
    }
    if let Some(min_salary) = request.min_salary_lpa {
        params.min_salary_lpa = min_salary;
    }
    if let Some(location) = request.location.filter(|l| !l.trim().is_empty()) {
        params.location = location;
    }

    match search_once(&state.ctx, &params).await {
        Ok(outcome) => Json(SearchResponse {
            total_jobs: outcome.total_jobs,
            filtered_jobs: outcome.filtered_jobs,
            jobs: outcome
                .jobs
                .into_iter()
                .take(SEARCH_RESPONSE_LIMIT)
                .collect(),
            search_date: outcome.search_date.to_rfc3339(),
            report_file: outcome.report_file,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Manual search failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
        }
    }
}

/// Start a guarded search cycle in the background
pub async fn trigger_search_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<TriggerResponse>) {
    if state.ctx.is_cycle_running() {
        return (
            StatusCode::CONFLICT,
            Json(TriggerResponse {
                message: "Job search already running".to_string(),
                status: "running".to_string(),
            }),
        );
    }

    let ctx = state.ctx.clone();
    tokio::spawn(async move {
        run_triggered_cycle(&ctx, "http").await;
    });

    (
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            message: "Job search triggered".to_string(),
            status: "running".to_string(),
        }),
    )
}
