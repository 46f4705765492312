//! Shared fixtures: fake Arr, list and autobrr servers on 127.0.0.1:0

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use omegabrr::config::{ArrConfig, ArrType, AutobrrConfig};

pub const API_KEY: &str = "secret";

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("X-Api-Key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

// ============================================================================
// Fake autobrr
// ============================================================================

/// PATCH bodies received by the fake autobrr, in arrival order
#[derive(Clone, Default)]
pub struct RecordedPatches(pub Arc<Mutex<Vec<(i64, Value)>>>);

impl RecordedPatches {
    pub fn take(&self) -> Vec<(i64, Value)> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Filter id the fake autobrr always fails with a 500
pub const BROKEN_FILTER_ID: i64 = 13;

async fn list_filters(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(json!([
        {"id": 1, "name": "TV", "enabled": true, "created_at": "2024-01-01T00:00:00Z"},
        {"id": 2, "name": "Movies", "enabled": false}
    ])))
}

async fn patch_filter(
    State(recorded): State<RecordedPatches>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }

    recorded.0.lock().push((id, body));

    if id == BROKEN_FILTER_ID {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

pub async fn spawn_autobrr() -> (String, RecordedPatches) {
    let recorded = RecordedPatches::default();
    let router = Router::new()
        .route("/api/filters", get(list_filters))
        .route("/api/filters/{id}", patch(patch_filter))
        .with_state(recorded.clone());

    (spawn_server(router).await, recorded)
}

pub fn autobrr_config(host: &str) -> AutobrrConfig {
    AutobrrConfig {
        host: host.to_string(),
        apikey: API_KEY.to_string(),
        basic_auth: None,
    }
}

// ============================================================================
// Fake Arr instance
// ============================================================================

fn arr_json(headers: HeaderMap, body: Value) -> Result<Json<Value>, StatusCode> {
    if authorized(&headers) {
        Ok(Json(body))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// One server answering the Sonarr, Radarr, Lidarr and Readarr endpoints
pub async fn spawn_arr() -> String {
    let router = Router::new()
        .route(
            "/api/v3/series",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([
                        {
                            "title": "Brooklyn Nine-Nine",
                            "monitored": true,
                            "tags": [],
                            "alternateTitles": [{"title": "B99"}]
                        },
                        {"title": "The Office", "monitored": true, "tags": [1]},
                        {"title": "Fargo", "monitored": false, "tags": []}
                    ]),
                )
            }),
        )
        .route(
            "/api/v3/movie",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([
                        {"title": "Heat", "originalTitle": "Heat", "monitored": true, "tags": []},
                        {"title": "Amélie", "originalTitle": "Le Fabuleux Destin d'Amélie Poulain", "monitored": true, "tags": [2]}
                    ]),
                )
            }),
        )
        .route(
            "/api/v3/tag",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([{"id": 1, "label": "keep"}, {"id": 2, "label": "skip"}]),
                )
            }),
        )
        .route(
            "/api/v1/album",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([
                        {"title": "OK Computer", "monitored": true, "artistId": 1},
                        {"title": "Homogenic", "monitored": true, "artistId": 2}
                    ]),
                )
            }),
        )
        .route(
            "/api/v1/artist",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([
                        {"id": 1, "artistName": "Radiohead", "monitored": true},
                        {"id": 2, "artistName": "Björk", "monitored": false}
                    ]),
                )
            }),
        )
        .route(
            "/api/v1/book",
            get(|headers: HeaderMap| async move {
                arr_json(
                    headers,
                    json!([
                        {"title": "Dune Messiah", "monitored": true},
                        {"title": "Children of Dune", "monitored": false}
                    ]),
                )
            }),
        );

    spawn_server(router).await
}

pub fn arr_config(name: &str, arr_type: ArrType, host: &str, filters: Vec<i64>) -> ArrConfig {
    ArrConfig {
        name: name.to_string(),
        arr_type,
        host: host.to_string(),
        apikey: API_KEY.to_string(),
        basic_auth: None,
        filters,
        tags_include: Vec::new(),
        tags_exclude: Vec::new(),
        match_release: false,
        exclude_alternate_titles: false,
        include_unmonitored: false,
    }
}
