//! Filter processing
//!
//! Walks every configured Arr instance and list, turns their titles into
//! patterns and writes the joined patterns into each configured filter.
//! A failing source is logged and reported but never stops the others.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info, warn};

use crate::config::{ArrConfig, ArrType, Config, ListConfig, ListType};
use crate::services::arr::{Album, ArrClient, Artist, Book, Movie, Series};
use crate::services::autobrr::{AutobrrClient, Filter, FilterUpdater, UpdateFilter};
use crate::services::lists::{ListClient, list_update};
use crate::services::tags::{ArrTag, passes_tag_rules};
use crate::services::title::process_title;

/// Which sources a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    Arr,
    Lists,
    Both,
}

pub struct ProcessorService {
    config: Arc<Config>,
    lists: ListClient,
}

impl ProcessorService {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        Ok(Self {
            config,
            lists: ListClient::new()?,
        })
    }

    fn autobrr(&self) -> Result<AutobrrClient> {
        let config = self
            .config
            .clients
            .autobrr
            .as_ref()
            .context("autobrr client is not configured")?;

        AutobrrClient::new(config).context("Failed to create autobrr client")
    }

    /// Run the requested sources against the configured filter API.
    ///
    /// Returns one message per failed source. Only a missing filter API
    /// configuration is an error.
    pub async fn process(&self, kind: ProcessKind, dry_run: bool) -> Result<Vec<String>> {
        let autobrr = self.autobrr()?;
        let mut errors = Vec::new();

        if matches!(kind, ProcessKind::Arr | ProcessKind::Both) {
            errors.extend(self.process_arrs_with(&autobrr, dry_run).await);
        }

        if matches!(kind, ProcessKind::Lists | ProcessKind::Both) {
            errors.extend(self.process_lists_with(&autobrr, dry_run).await);
        }

        Ok(errors)
    }

    pub async fn process_arrs(&self, dry_run: bool) -> Result<Vec<String>> {
        self.process(ProcessKind::Arr, dry_run).await
    }

    pub async fn process_lists(&self, dry_run: bool) -> Result<Vec<String>> {
        self.process(ProcessKind::Lists, dry_run).await
    }

    /// List the filters known to the filter API
    pub async fn get_filters(&self) -> Result<Vec<Filter>> {
        self.autobrr()?
            .get_filters()
            .await
            .context("Failed to fetch filters from autobrr")
    }

    pub async fn process_arrs_with(&self, updater: &dyn FilterUpdater, dry_run: bool) -> Vec<String> {
        let mut errors = Vec::new();

        for arr in &self.config.clients.arr {
            if let Err(err) = self.process_arr(arr, updater, dry_run).await {
                let message = format!("{:#}", err);
                error!(
                    r#type = arr.arr_type.as_str(),
                    client = %arr.name,
                    error = %message,
                    "Failed to process arr client"
                );
                errors.push(format!("{} - {}: {}", arr.arr_type, arr.name, message));
            }
        }

        errors
    }

    pub async fn process_lists_with(&self, updater: &dyn FilterUpdater, dry_run: bool) -> Vec<String> {
        let mut errors = Vec::new();

        for list in &self.config.lists {
            if let Err(err) = self.process_list(list, updater, dry_run).await {
                let message = format!("{:#}", err);
                error!(
                    r#type = list.list_type.as_str(),
                    client = %list.name,
                    error = %message,
                    "Failed to process list"
                );
                errors.push(format!("{} - {}: {}", list.list_type, list.name, message));
            }
        }

        errors
    }

    async fn process_arr(
        &self,
        arr: &ArrConfig,
        updater: &dyn FilterUpdater,
        dry_run: bool,
    ) -> Result<()> {
        debug!(r#type = arr.arr_type.as_str(), client = %arr.name, "Gathering titles");

        let client = ArrClient::new(arr)?;

        let update = match arr.arr_type {
            ArrType::Sonarr => {
                let series = client.get_series().await?;
                let tags = fetch_tags(&client, arr).await;
                let patterns = series_patterns(arr, &series, &tags);
                log_collected(arr, patterns.len());
                UpdateFilter::shows_or_releases(join_patterns(&patterns), arr.match_release)
            }
            ArrType::Radarr | ArrType::Whisparr => {
                let movies = client.get_movies().await?;
                let tags = fetch_tags(&client, arr).await;
                let patterns = movie_patterns(arr, &movies, &tags);
                log_collected(arr, patterns.len());
                UpdateFilter::shows_or_releases(join_patterns(&patterns), arr.match_release)
            }
            ArrType::Readarr => {
                let books = client.get_books().await?;
                let patterns = book_patterns(arr, &books);
                log_collected(arr, patterns.len());
                UpdateFilter::match_releases(join_patterns(&patterns))
            }
            ArrType::Lidarr => {
                let albums = client.get_albums().await?;
                let artists = client.get_artists().await?;
                let (albums, artists) = music_patterns(arr, &albums, &artists);
                log_collected(arr, albums.len() + artists.len());
                music_update(&albums, &artists, arr.match_release)
            }
        };

        if update.is_empty() {
            info!(r#type = arr.arr_type.as_str(), client = %arr.name, "No titles found, skipping filter update");
            return Ok(());
        }

        push_filters(updater, &arr.filters, &update, dry_run).await
    }

    async fn process_list(
        &self,
        list: &ListConfig,
        updater: &dyn FilterUpdater,
        dry_run: bool,
    ) -> Result<()> {
        let titles = self.lists.fetch_titles(list).await?;

        let patterns = collect_patterns(titles.iter().map(String::as_str), list.match_release);
        info!(
            r#type = list.list_type.as_str(),
            client = %list.name,
            titles = titles.len(),
            patterns = patterns.len(),
            "Collected patterns"
        );

        if patterns.is_empty() {
            if list.list_type == ListType::Trakt && list.url.contains("mdblist.com") {
                warn!(
                    client = %list.name,
                    url = %list.url,
                    "Found an mdblist URL in a trakt list, set it up as \"type: mdblist\" instead"
                );
            } else {
                info!(client = %list.name, url = %list.url, "No titles found, skipping filter update");
            }
            return Ok(());
        }

        let update = list_update(list, join_patterns(&patterns));
        push_filters(updater, &list.filters, &update, dry_run).await
    }
}

async fn fetch_tags(client: &ArrClient, arr: &ArrConfig) -> Vec<ArrTag> {
    if !arr.uses_tags() {
        return Vec::new();
    }

    match client.get_tags().await {
        Ok(tags) => tags,
        Err(err) => {
            let message = format!("{:#}", err);
            warn!(client = %arr.name, error = %message, "Failed to fetch tags, continuing without");
            Vec::new()
        }
    }
}

fn log_collected(arr: &ArrConfig, patterns: usize) {
    info!(
        r#type = arr.arr_type.as_str(),
        client = %arr.name,
        patterns,
        "Collected patterns"
    );
}

/// Write the same update to every filter id.
///
/// Every id is attempted; the error names the ids that failed.
async fn push_filters(
    updater: &dyn FilterUpdater,
    filters: &[i64],
    update: &UpdateFilter,
    dry_run: bool,
) -> Result<()> {
    let mut failed = Vec::new();

    for &filter_id in filters {
        if dry_run {
            info!(filter_id, "Dry run, not updating filter");
            continue;
        }

        match updater.update_filter(filter_id, update).await {
            Ok(()) => info!(filter_id, "Updated filter"),
            Err(err) => {
                error!(filter_id, error = %err, "Failed to update filter");
                failed.push(filter_id.to_string());
            }
        }
    }

    if !failed.is_empty() {
        bail!("failed to update filters: {}", failed.join(", "));
    }

    Ok(())
}

/// Patterns for every given title, merged and ordered
pub fn collect_patterns<'a>(
    titles: impl IntoIterator<Item = &'a str>,
    match_release: bool,
) -> BTreeSet<String> {
    titles
        .into_iter()
        .flat_map(|title| process_title(title, match_release))
        .collect()
}

pub fn join_patterns(patterns: &BTreeSet<String>) -> String {
    patterns.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

pub fn series_patterns(arr: &ArrConfig, series: &[Series], tags: &[ArrTag]) -> BTreeSet<String> {
    let titles = series
        .iter()
        .filter(|s| arr.should_process(s.monitored))
        .filter(|s| passes_tag_rules(tags, &s.tags, &arr.tags_include, &arr.tags_exclude))
        .flat_map(|s| {
            let alternates = s
                .alternate_titles
                .iter()
                .filter(|_| !arr.exclude_alternate_titles)
                .map(|alt| alt.title.as_str());
            std::iter::once(s.title.as_str()).chain(alternates)
        });

    collect_patterns(titles, arr.match_release)
}

pub fn movie_patterns(arr: &ArrConfig, movies: &[Movie], tags: &[ArrTag]) -> BTreeSet<String> {
    let titles = movies
        .iter()
        .filter(|m| arr.should_process(m.monitored))
        .filter(|m| passes_tag_rules(tags, &m.tags, &arr.tags_include, &arr.tags_exclude))
        .flat_map(|m| std::iter::once(m.title.as_str()).chain(m.original_title.as_deref()));

    collect_patterns(titles, arr.match_release)
}

pub fn book_patterns(arr: &ArrConfig, books: &[Book]) -> BTreeSet<String> {
    let titles = books
        .iter()
        .filter(|b| arr.should_process(b.monitored))
        .map(|b| b.title.as_str());

    collect_patterns(titles, arr.match_release)
}

/// Album and artist patterns for albums whose artist is also wanted
pub fn music_patterns(
    arr: &ArrConfig,
    albums: &[Album],
    artists: &[Artist],
) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut album_titles = Vec::new();
    let mut artist_names = BTreeSet::new();

    for album in albums.iter().filter(|a| arr.should_process(a.monitored)) {
        let Some(artist) = artists.iter().find(|artist| artist.id == album.artist_id) else {
            debug!(album = %album.title, artist_id = album.artist_id, "Album without known artist");
            continue;
        };

        if arr.should_process(artist.monitored) {
            album_titles.push(album.title.as_str());
            artist_names.insert(artist.artist_name.as_str());
        }
    }

    (
        collect_patterns(album_titles, arr.match_release),
        collect_patterns(artist_names, arr.match_release),
    )
}

fn music_update(
    albums: &BTreeSet<String>,
    artists: &BTreeSet<String>,
    match_release: bool,
) -> UpdateFilter {
    if match_release {
        return UpdateFilter::match_releases(join_patterns(albums));
    }

    let non_empty = |patterns: &BTreeSet<String>| {
        (!patterns.is_empty()).then(|| join_patterns(patterns))
    };

    UpdateFilter {
        albums: non_empty(albums),
        artists: non_empty(artists),
        ..Default::default()
    }
}
