//! Integration tests for the HTTP API

mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

use common::{autobrr_config, spawn_autobrr};
use omegabrr::app::{AppState, build_app};
use omegabrr::config::Config;
use omegabrr::services::ProcessorService;

fn app(config: Config) -> Router {
    let config = Arc::new(config);
    let processor = Arc::new(ProcessorService::new(config.clone()).unwrap());
    build_app(AppState { config, processor })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    for uri in ["/api/healthz/liveness", "/api/healthz/readiness"] {
        let (status, body) = get(app(Config::default()), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }
}

#[tokio::test]
async fn test_version() {
    let (status, body) = get(app(Config::default()), "/api/version").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["commit"].is_string());
}

#[tokio::test]
async fn test_filters() {
    let (host, _) = spawn_autobrr().await;
    let mut config = Config::default();
    config.clients.autobrr = Some(autobrr_config(&host));

    let (status, body) = get(app(config), "/api/filters").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json[0]["name"], "TV");
    assert_eq!(json[1]["id"], 2);
}

#[tokio::test]
async fn test_filters_without_autobrr() {
    let (status, body) = get(app(Config::default()), "/api/filters").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(app(Config::default()), "/api/webhook/trigger").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
