//! Filter listing proxied from autobrr

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::error;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

async fn list_filters(State(state): State<AppState>) -> Response {
    match state.processor.get_filters().await {
        Ok(filters) => Json(filters).into_response(),
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Failed to list filters");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: message }),
            )
                .into_response()
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/filters", get(list_filters))
}
