pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::comparison::handlers as comparison;
use crate::state::AppState;
use crate::upload::handlers as upload;

/// Request body ceiling. Multipart PDFs routinely exceed axum's 2 MiB default.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resumes", get(upload::handle_list_resumes))
        .route("/api/v1/resumes/upload", post(upload::handle_upload))
        // Analysis API
        .route(
            "/api/v1/analyze/:resume_id",
            get(analysis::handle_get_analysis).post(analysis::handle_trigger_analysis),
        )
        // Comparison API
        .route("/api/v1/compare", post(comparison::handle_compare))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
