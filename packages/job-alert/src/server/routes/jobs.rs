use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::error;

use super::error_response;
use crate::server::app::AppState;

/// Latest saved search results
pub async fn latest_jobs_handler(Extension(state): Extension<AppState>) -> Response {
    match state.ctx.reports.load_latest_jobs() {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load latest jobs");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
        }
    }
}

/// Latest HTML report
pub async fn latest_report_handler(Extension(state): Extension<AppState>) -> Response {
    let path = match state.ctx.reports.latest_report() {
        Ok(Some(path)) => path,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "No reports available").into_response()
        }
        Err(e) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
                .into_response()
        }
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read report");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
