//! Build information

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
}

impl VersionResponse {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("OMEGABRR_COMMIT").unwrap_or("unknown"),
        }
    }
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse::current())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/version", get(version))
}
