pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::review::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/reviews", post(handlers::handle_review))
        .route("/api/v1/reviews/annotate", post(handlers::handle_annotate))
        .route("/api/v1/reviews/compare", post(handlers::handle_compare))
        .route("/api/v1/reviews/rewrite", post(handlers::handle_rewrite))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
