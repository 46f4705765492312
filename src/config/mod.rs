//! Application configuration management
//!
//! Configuration lives in a YAML file (camelCase keys). A handful of settings
//! can be overridden from the environment, which is read after `.env`.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7441;
pub const DEFAULT_SCHEDULE: &str = "0 */6 * * *";

/// Application configuration loaded from the YAML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server: ServerConfig,

    /// Cron expression for the scheduled run (5 or 6 fields)
    #[serde(default = "default_schedule")]
    pub schedule: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub clients: ClientsConfig,

    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<ListConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsConfig {
    #[serde(default)]
    pub autobrr: Option<AutobrrConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub arr: Vec<ArrConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

/// Downstream filter API (autobrr)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutobrrConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub apikey: String,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrType {
    Sonarr,
    Radarr,
    Lidarr,
    Readarr,
    Whisparr,
}

impl ArrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrType::Sonarr => "sonarr",
            ArrType::Radarr => "radarr",
            ArrType::Lidarr => "lidarr",
            ArrType::Readarr => "readarr",
            ArrType::Whisparr => "whisparr",
        }
    }
}

impl fmt::Display for ArrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrType::Sonarr => "Sonarr",
            ArrType::Radarr => "Radarr",
            ArrType::Lidarr => "Lidarr",
            ArrType::Readarr => "Readarr",
            ArrType::Whisparr => "Whisparr",
        };
        f.write_str(name)
    }
}

/// One Arr instance whose library feeds a set of filters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub arr_type: ArrType,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub apikey: String,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Vec<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags_include: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags_exclude: Vec<String>,
    #[serde(default)]
    pub match_release: bool,
    #[serde(default)]
    pub exclude_alternate_titles: bool,
    #[serde(default)]
    pub include_unmonitored: bool,
}

impl ArrConfig {
    /// Whether an item with the given monitored state should be processed
    pub fn should_process(&self, monitored: bool) -> bool {
        monitored || self.include_unmonitored
    }

    pub fn uses_tags(&self) -> bool {
        !self.tags_include.is_empty() || !self.tags_exclude.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Trakt,
    Mdblist,
    Metacritic,
    Steam,
    Plaintext,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Trakt => "trakt",
            ListType::Mdblist => "mdblist",
            ListType::Metacritic => "metacritic",
            ListType::Steam => "steam",
            ListType::Plaintext => "plaintext",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListType::Trakt => "Trakt",
            ListType::Mdblist => "Mdblist",
            ListType::Metacritic => "Metacritic",
            ListType::Steam => "Steam",
            ListType::Plaintext => "Plaintext",
        };
        f.write_str(name)
    }
}

/// One curated list feeding a set of filters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Vec<i64>,
    #[serde(default)]
    pub match_release: bool,
    /// Extra request headers (API keys, cookies)
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from `path`, writing a template there first if the
    /// file does not exist. Without a path the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    write_template(path)?;
                    info!(path = %path.display(), "Wrote default config file");
                }

                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_yaml(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => {
                debug!("No config file given, using defaults");
                Self::default_config()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An all-comment file is a YAML null document
        let config: Option<Config> =
            serde_yaml::from_str(contents).context("Invalid YAML configuration")?;
        Ok(config.unwrap_or_else(Self::default_config))
    }

    fn default_config() -> Self {
        Self {
            schedule: default_schedule(),
            ..Default::default()
        }
    }

    /// Apply OMEGABRR_HOST, OMEGABRR_PORT and OMEGABRR_SCHEDULE
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = env::var("OMEGABRR_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = env::var("OMEGABRR_PORT") {
            self.server.port = port.parse().context("Invalid OMEGABRR_PORT")?;
        }

        if let Ok(schedule) = env::var("OMEGABRR_SCHEDULE") {
            self.schedule = schedule;
        }

        Ok(())
    }

    /// Check required fields of every configured client and list
    pub fn validate(&self) -> Result<()> {
        if let Some(autobrr) = &self.clients.autobrr {
            if autobrr.host.trim().is_empty() {
                bail!("autobrr: missing host");
            }
            if autobrr.apikey.trim().is_empty() {
                bail!("autobrr: missing apikey");
            }
        }

        for arr in &self.clients.arr {
            if arr.name.trim().is_empty() {
                bail!("{} client without a name", arr.arr_type.as_str());
            }
            if arr.host.trim().is_empty() {
                bail!("{} client {}: missing host", arr.arr_type.as_str(), arr.name);
            }
            if arr.apikey.trim().is_empty() {
                bail!("{} client {}: missing apikey", arr.arr_type.as_str(), arr.name);
            }
        }

        for list in &self.lists {
            if list.name.trim().is_empty() {
                bail!("{} list without a name", list.list_type.as_str());
            }
        }

        Ok(())
    }

    /// Schedule as a six-field cron expression (seconds first)
    pub fn cron_schedule(&self) -> String {
        let schedule = self.schedule.trim();
        let schedule = if schedule.is_empty() {
            DEFAULT_SCHEDULE
        } else {
            schedule
        };

        if schedule.split_whitespace().count() == 5 {
            format!("0 {}", schedule)
        } else {
            schedule.to_string()
        }
    }
}

/// Pick the config file: explicit path (flag or OMEGABRR_CONFIG), then the
/// user config directory if a config.yaml exists there.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    dirs::config_dir()
        .map(|dir| dir.join("omegabrr").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Write a commented starter config to `path`
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let host = if in_container() { "0.0.0.0" } else { "127.0.0.1" };

    fs::write(path, render_template(host))
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

fn in_container() -> bool {
    if Path::new("/.dockerenv").exists() {
        return true;
    }

    fs::read_to_string("/proc/1/cgroup")
        .map(|cgroup| cgroup.contains("/docker") || cgroup.contains("/lxc"))
        .unwrap_or(false)
}

fn render_template(host: &str) -> String {
    format!(
        r#"# config.yaml
---
server:
  host: {host}
  port: {DEFAULT_PORT}
schedule: "{DEFAULT_SCHEDULE}"
clients:
  autobrr:
  #  host: http://localhost:7474
  #  apikey: API_KEY
  #  basicAuth:
  #    user: username
  #    pass: password

  arr:
  #  - name: radarr
  #    type: radarr
  #    host: http://localhost:7878
  #    apikey: API_KEY
  #    filters:
  #      - 15 # Change me

  #  - name: sonarr
  #    type: sonarr
  #    host: http://localhost:8989
  #    apikey: API_KEY
  #    filters:
  #      - 14 # Change me
  #    #excludeAlternateTitles: true # defaults to false

  #  - name: readarr
  #    type: readarr
  #    host: http://localhost:8787
  #    apikey: API_KEY
  #    filters:
  #      - 18 # Change me

  #  - name: lidarr
  #    type: lidarr
  #    host: http://localhost:8686
  #    apikey: API_KEY
  #    filters:
  #      - 32 # Change me

  #  - name: whisparr
  #    type: whisparr
  #    host: http://localhost:6969
  #    apikey: API_KEY
  #    filters:
  #      - 69 # Change me

lists:
#  - name: Latest TV Shows
#    type: trakt
#    url: https://api.autobrr.com/trakt/list/popular-tv
#    filters:
#      - 15 # Change me

#  - name: Personal list
#    type: plaintext
#    url: https://gist.githubusercontent.com/autobrr/example/raw/list.txt
#    filters:
#      - 27 # Change me
"#
    )
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

/// Treat an explicit YAML `null` (a key followed only by comments) as the default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
server:
  host: 127.0.0.1
  port: 7442
schedule: "0 */2 * * *"
clients:
  autobrr:
    host: http://localhost:7474
    apikey: secret
    basicAuth:
      user: admin
      pass: hunter2
  arr:
    - name: sonarr
      type: sonarr
      host: http://localhost:8989
      apikey: abc
      filters: [14, 15]
      tagsInclude: [want]
      matchRelease: true
      excludeAlternateTitles: true
    - name: lidarr
      type: lidarr
      host: http://localhost:8686
      apikey: def
      filters: [32]
      includeUnmonitored: true
lists:
  - name: popular
    type: trakt
    url: https://api.autobrr.com/trakt/list/popular-tv
    filters: [20]
    headers:
      Authorization: Bearer xyz
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml(FULL_CONFIG).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7442);
        assert_eq!(config.schedule, "0 */2 * * *");

        let autobrr = config.clients.autobrr.as_ref().unwrap();
        assert_eq!(autobrr.host, "http://localhost:7474");
        assert_eq!(autobrr.basic_auth.as_ref().unwrap().user, "admin");

        assert_eq!(config.clients.arr.len(), 2);
        let sonarr = &config.clients.arr[0];
        assert_eq!(sonarr.arr_type, ArrType::Sonarr);
        assert_eq!(sonarr.filters, vec![14, 15]);
        assert_eq!(sonarr.tags_include, vec!["want".to_string()]);
        assert!(sonarr.match_release);
        assert!(sonarr.exclude_alternate_titles);
        assert!(!sonarr.include_unmonitored);

        let lidarr = &config.clients.arr[1];
        assert_eq!(lidarr.arr_type, ArrType::Lidarr);
        assert!(lidarr.include_unmonitored);

        assert_eq!(config.lists.len(), 1);
        assert_eq!(config.lists[0].list_type, ListType::Trakt);
        assert_eq!(
            config.lists[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer xyz")
        );

        config.validate().unwrap();
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = Config::from_yaml("clients:\n  autobrr:\n  arr:\n").unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.schedule, DEFAULT_SCHEDULE);
        assert!(config.clients.autobrr.is_none());
        assert!(config.clients.arr.is_empty());
        assert!(config.lists.is_empty());
    }

    #[test]
    fn test_template_parses() {
        let config = Config::from_yaml(&render_template("127.0.0.1")).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.clients.autobrr.is_none());
        assert!(config.clients.arr.is_empty());
        assert!(config.lists.is_empty());
    }

    #[test]
    fn test_load_writes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, FULL_CONFIG).unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.clients.arr.len(), 2);
    }

    #[test]
    fn test_unknown_arr_type_rejected() {
        let yaml = "clients:\n  arr:\n    - name: x\n      type: plex\n      host: h\n      apikey: k\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_validate_missing_apikey() {
        let yaml = "clients:\n  arr:\n    - name: radarr\n      type: radarr\n      host: http://localhost:7878\n";
        let config = Config::from_yaml(yaml).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("missing apikey"));
    }

    #[test]
    fn test_validate_autobrr_host() {
        let yaml = "clients:\n  autobrr:\n    apikey: k\n";
        let config = Config::from_yaml(yaml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cron_schedule() {
        let mut config = Config::default_config();
        assert_eq!(config.cron_schedule(), "0 0 */6 * * *");

        config.schedule = "30 0 */2 * * *".to_string();
        assert_eq!(config.cron_schedule(), "30 0 */2 * * *");

        config.schedule = "  ".to_string();
        assert_eq!(config.cron_schedule(), "0 0 */6 * * *");
    }

    #[test]
    fn test_should_process() {
        let yaml = "clients:\n  arr:\n    - name: radarr\n      type: radarr\n      host: h\n      apikey: k\n";
        let mut config = Config::from_yaml(yaml).unwrap();
        let arr = &mut config.clients.arr[0];

        assert!(arr.should_process(true));
        assert!(!arr.should_process(false));

        arr.include_unmonitored = true;
        assert!(arr.should_process(false));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let explicit = PathBuf::from("/tmp/omegabrr-test.yaml");
        assert_eq!(resolve_config_path(Some(explicit.clone())), Some(explicit));
    }
}
