//! Health check endpoints

use axum::{Router, routing::get};

use crate::app::AppState;

/// Liveness - OK as long as the server answers
async fn liveness() -> &'static str {
    "OK"
}

/// Readiness - nothing to warm up, ready once listening
async fn readiness() -> &'static str {
    "OK"
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz/liveness", get(liveness))
        .route("/healthz/readiness", get(readiness))
}
