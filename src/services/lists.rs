//! Curated list fetchers
//!
//! Each list type is a single GET returning titles in its own shape. The
//! fetch is shared; only validation and parsing differ per type.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::{ListConfig, ListType};
use crate::services::autobrr::UpdateFilter;
use crate::services::http::build_client;

pub const TRAKT_URL_PREFIX: &str = "https://api.autobrr.com/trakt";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Deserialize)]
struct TraktItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    movie: Option<TitleOnly>,
    #[serde(default)]
    show: Option<TitleOnly>,
}

#[derive(Debug, Deserialize)]
struct TitleOnly {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct MetacriticList {
    #[serde(default)]
    albums: Vec<MetacriticAlbum>,
}

#[derive(Debug, Deserialize)]
struct MetacriticAlbum {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SteamApp {
    #[serde(default)]
    name: String,
}

/// Fetches raw titles from list URLs
pub struct ListClient {
    client: Client,
}

impl ListClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(30))?,
        })
    }

    /// Download and parse the titles of one list
    pub async fn fetch_titles(&self, list: &ListConfig) -> Result<Vec<String>> {
        let url = list.url.trim();
        if url.is_empty() {
            bail!("no URL provided for {} list", list.list_type);
        }

        if list.list_type == ListType::Trakt && !url.starts_with(TRAKT_URL_PREFIX) {
            bail!(
                "invalid URL provided for Trakt list, URL must start with {}",
                TRAKT_URL_PREFIX
            );
        }

        debug!(r#type = list.list_type.as_str(), client = %list.name, url, "Fetching titles");

        let mut request = self.client.get(url);
        for (key, value) in &list.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch titles from URL: {}", url))?;

        let status = response.status();
        if list.list_type == ListType::Metacritic && status == StatusCode::NOT_FOUND {
            bail!("No endpoint found at {}. (404 Not Found)", url);
        }
        if status != StatusCode::OK {
            bail!("Failed to fetch titles from URL: {} (status: {})", url, status);
        }

        match list.list_type {
            ListType::Trakt | ListType::Metacritic => {
                ensure_content_type(&response, JSON_CONTENT_TYPE, url)?
            }
            ListType::Plaintext => ensure_content_type(&response, TEXT_CONTENT_TYPE, url)?,
            ListType::Mdblist | ListType::Steam => {}
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from URL: {}", url))?;

        parse_titles(list.list_type, &body)
            .with_context(|| format!("Failed to decode {} data from URL: {}", list.list_type, url))
    }
}

fn ensure_content_type(response: &Response, expected: &str, url: &str) -> Result<()> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with(expected) {
        bail!(
            "invalid content type for URL: {}, content type should be {}",
            url,
            expected
        );
    }

    Ok(())
}

/// Extract titles from a list response body
pub fn parse_titles(list_type: ListType, body: &str) -> Result<Vec<String>> {
    let titles: Vec<String> = match list_type {
        ListType::Trakt => {
            let items: Vec<TraktItem> = serde_json::from_str(body)?;
            items
                .into_iter()
                .flat_map(|item| {
                    [
                        Some(item.title),
                        item.movie.map(|m| m.title),
                        item.show.map(|s| s.title),
                    ]
                })
                .flatten()
                .collect()
        }
        ListType::Mdblist => {
            let items: Vec<TitleOnly> = serde_json::from_str(body)?;
            items.into_iter().map(|item| item.title).collect()
        }
        ListType::Metacritic => {
            let list: MetacriticList = serde_json::from_str(body)?;
            list.albums.into_iter().map(|album| album.title).collect()
        }
        ListType::Steam => {
            let apps: BTreeMap<String, SteamApp> = serde_json::from_str(body)?;
            apps.into_values().map(|app| app.name).collect()
        }
        ListType::Plaintext => body.lines().map(|line| line.trim().to_string()).collect(),
    };

    Ok(titles
        .into_iter()
        .filter(|title| !title.trim().is_empty())
        .collect())
}

/// Filter update carrying the joined patterns in the field this list type feeds
pub fn list_update(list: &ListConfig, patterns: String) -> UpdateFilter {
    match list.list_type {
        ListType::Steam => UpdateFilter::match_releases(patterns),
        ListType::Metacritic if list.match_release => UpdateFilter::match_releases(patterns),
        ListType::Metacritic => UpdateFilter::albums(patterns),
        ListType::Trakt | ListType::Mdblist | ListType::Plaintext => {
            UpdateFilter::shows_or_releases(patterns, list.match_release)
        }
    }
}
