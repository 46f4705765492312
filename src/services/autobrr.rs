//! autobrr filter API client
//!
//! Only the two endpoints needed here: listing filters and patching the
//! pattern fields of a filter by id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::{AutobrrConfig, BasicAuth};
use crate::services::http::{join_url, user_agent};

#[derive(Debug, Error)]
pub enum AutobrrError {
    #[error("invalid autobrr url: {0}")]
    Url(#[from] url::ParseError),
    #[error("autobrr request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("autobrr returned unexpected status {status} for {endpoint}")]
    Status { status: StatusCode, endpoint: String },
    #[error("failed to decode autobrr response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Filter as listed by `GET /api/filters`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Partial filter update; only populated fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albums: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artists: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_releases: Option<String>,
}

impl UpdateFilter {
    pub fn shows(patterns: String) -> Self {
        Self {
            shows: Some(patterns),
            ..Default::default()
        }
    }

    pub fn albums(patterns: String) -> Self {
        Self {
            albums: Some(patterns),
            ..Default::default()
        }
    }

    pub fn match_releases(patterns: String) -> Self {
        Self {
            match_releases: Some(patterns),
            ..Default::default()
        }
    }

    /// `match_releases` when matching whole release names, `shows` otherwise
    pub fn shows_or_releases(patterns: String, match_release: bool) -> Self {
        if match_release {
            Self::match_releases(patterns)
        } else {
            Self::shows(patterns)
        }
    }

    /// True when no field carries any pattern
    pub fn is_empty(&self) -> bool {
        [&self.shows, &self.albums, &self.artists, &self.match_releases]
            .iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}

/// Anything that can apply a filter update (the real API, or a dry-run/test double)
#[async_trait]
pub trait FilterUpdater: Send + Sync {
    async fn update_filter(&self, filter_id: i64, update: &UpdateFilter)
        -> Result<(), AutobrrError>;
}

/// autobrr API client
pub struct AutobrrClient {
    base_url: Url,
    api_key: String,
    basic_auth: Option<BasicAuth>,
    client: Client,
}

impl AutobrrClient {
    pub fn new(config: &AutobrrConfig) -> Result<Self, AutobrrError> {
        let base_url = join_url(&config.host, "")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            base_url,
            api_key: config.apikey.clone(),
            basic_auth: config.basic_auth.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AutobrrError> {
        Ok(join_url(self.base_url.as_str(), path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Api-Key", &self.api_key);
        match &self.basic_auth {
            Some(auth) if !auth.user.is_empty() => {
                request.basic_auth(&auth.user, Some(&auth.pass))
            }
            _ => request,
        }
    }

    /// List all filters
    pub async fn get_filters(&self) -> Result<Vec<Filter>, AutobrrError> {
        let url = self.endpoint("/api/filters")?;
        let response = self.authorize(self.client.get(url.clone())).send().await?;

        if response.status() != StatusCode::OK {
            return Err(AutobrrError::Status {
                status: response.status(),
                endpoint: url.path().to_string(),
            });
        }

        response.json().await.map_err(AutobrrError::Decode)
    }

    /// Patch the pattern fields of one filter; autobrr answers 204
    pub async fn update_filter_by_id(
        &self,
        filter_id: i64,
        update: &UpdateFilter,
    ) -> Result<(), AutobrrError> {
        let url = self.endpoint(&format!("/api/filters/{}", filter_id))?;
        debug!(filter_id, "Patching autobrr filter");

        let response = self
            .authorize(self.client.patch(url.clone()))
            .json(update)
            .send()
            .await?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(AutobrrError::Status {
                status: response.status(),
                endpoint: url.path().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl FilterUpdater for AutobrrClient {
    async fn update_filter(
        &self,
        filter_id: i64,
        update: &UpdateFilter,
    ) -> Result<(), AutobrrError> {
        self.update_filter_by_id(filter_id, update).await
    }
}
