//! Arr API client (Sonarr, Radarr, Lidarr, Readarr, Whisparr)
//!
//! All of them share the same REST conventions: `X-Api-Key` header, JSON
//! bodies, `/api/v3` for the video apps and `/api/v1` for Lidarr/Readarr.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ArrConfig, BasicAuth};
use crate::services::http::{build_client, join_url};
use crate::services::tags::ArrTag;

/// Series from `GET /api/v3/series`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub alternate_titles: Vec<AlternateTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlternateTitle {
    pub title: String,
}

/// Movie from `GET /api/v3/movie`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Album from `GET /api/v1/album`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    pub artist_id: i64,
}

/// Artist from `GET /api/v1/artist`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: i64,
    pub artist_name: String,
    #[serde(default)]
    pub monitored: bool,
}

/// Book from `GET /api/v1/book`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
}

/// Client for one configured Arr instance
pub struct ArrClient {
    name: String,
    host: String,
    api_key: String,
    basic_auth: Option<BasicAuth>,
    client: Client,
}

impl ArrClient {
    pub fn new(config: &ArrConfig) -> Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            host: config.host.clone(),
            api_key: config.apikey.clone(),
            basic_auth: config.basic_auth.clone(),
            client: build_client(Duration::from_secs(60))?,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = join_url(&self.host, path)
            .with_context(|| format!("Invalid host for {}: {}", self.name, self.host))?;

        debug!(client = %self.name, url = %url, "Fetching from Arr");

        let mut request = self.client.get(url).header("X-Api-Key", &self.api_key);
        if let Some(auth) = self.basic_auth.as_ref().filter(|a| !a.user.is_empty()) {
            request = request.basic_auth(&auth.user, Some(&auth.pass));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch {} from {}", path, self.name))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "{} request to {} failed with status: {}",
                path,
                self.name,
                response.status()
            );
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response from {}", path, self.name))
    }

    /// Sonarr series
    pub async fn get_series(&self) -> Result<Vec<Series>> {
        self.get("/api/v3/series").await
    }

    /// Radarr (and Whisparr) movies
    pub async fn get_movies(&self) -> Result<Vec<Movie>> {
        self.get("/api/v3/movie").await
    }

    /// Sonarr/Radarr tags
    pub async fn get_tags(&self) -> Result<Vec<ArrTag>> {
        self.get("/api/v3/tag").await
    }

    /// Lidarr albums
    pub async fn get_albums(&self) -> Result<Vec<Album>> {
        self.get("/api/v1/album").await
    }

    /// Lidarr artists
    pub async fn get_artists(&self) -> Result<Vec<Artist>> {
        self.get("/api/v1/artist").await
    }

    /// Readarr books
    pub async fn get_books(&self) -> Result<Vec<Book>> {
        self.get("/api/v1/book").await
    }
}
