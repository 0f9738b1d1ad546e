pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::scan::handlers;
use crate::state::AppState;

/// Uploaded résumés can exceed Axum's 2 MB default body limit.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scan API
        .route(
            "/api/v1/scans",
            post(handlers::handle_submit_scan).get(handlers::handle_list_scans),
        )
        .route(
            "/api/v1/scans/:resume_id",
            get(handlers::handle_get_scan).delete(handlers::handle_delete_scan),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
