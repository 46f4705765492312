//! Shared HTTP client setup for outgoing requests

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;

/// `omegabrr/<version> (<os> <arch>)`
pub fn user_agent() -> String {
    format!(
        "omegabrr/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Build a client with our user agent and the given request timeout
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .context("Failed to create HTTP client")
}

/// Join a configured host (with or without trailing slash, possibly with a
/// base path) and an API path.
pub fn join_url(host: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        host.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
