//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::SearchContext;
use crate::server::routes::{
    health_handler, index_handler, latest_jobs_handler, latest_report_handler, search_handler,
    status_handler, trigger_search_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<SearchContext>,
}

/// Build the Axum application router
pub fn build_app(ctx: Arc<SearchContext>) -> Router {
    let app_state = AppState { ctx };

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/jobs", get(latest_jobs_handler))
        .route("/report", get(latest_report_handler))
        .route("/status", get(status_handler))
        .route(
            "/trigger-search",
            get(trigger_search_handler).post(trigger_search_handler),
        )
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
