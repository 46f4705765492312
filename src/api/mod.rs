//! REST routes, mounted under /api

pub mod filters;
pub mod health;
pub mod version;

use axum::Router;

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(version::router())
        .merge(filters::router())
}
