use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    history: HistoryHealth,
    cycle_running: bool,
}

#[derive(Serialize)]
pub struct HistoryHealth {
    status: String,
    tracked_jobs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Endpoint index
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Job Alert",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/search": "Trigger manual job search (POST)",
            "/jobs": "Get latest job results",
            "/report": "Get latest HTML report",
            "/status": "Get system status",
            "/trigger-search": "Run a full search cycle in the background",
            "/health": "Health check"
        }
    }))
}

/// Health check endpoint
///
/// Returns 200 OK when the job history can be read, 503 Service Unavailable
/// otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let history = match state.ctx.storage.load() {
        Ok(store) => HistoryHealth {
            status: "ok".to_string(),
            tracked_jobs: store.len(),
            error: None,
        },
        Err(e) => HistoryHealth {
            status: "error".to_string(),
            tracked_jobs: 0,
            error: Some(e.to_string()),
        },
    };

    let is_healthy = history.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            history,
            cycle_running: state.ctx.is_cycle_running(),
        }),
    )
}
