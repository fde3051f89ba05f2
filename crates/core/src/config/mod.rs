//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ROAM_SW_*)
//! 2. TOML config file (if ROAM_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Which date the sitemap stamps on listing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitemapDatePolicy {
    /// Every entry carries today's date.
    #[default]
    AlwaysToday,
    /// Listing items carry their own publish date when it parses.
    UseItemDate,
}

/// A fixed sitemap entry for an in-page section or index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub path: String,
    pub changefreq: String,
    pub priority: String,
}

impl SectionEntry {
    fn new(path: &str, changefreq: &str, priority: &str) -> Self {
        Self { path: path.into(), changefreq: changefreq.into(), priority: priority.into() }
    }
}

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ROAM_SW_*)
/// 2. TOML config file (if ROAM_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via ROAM_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the site the worker serves. Relative request URLs resolve against it.
    ///
    /// Set via ROAM_SW_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via ROAM_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ROAM_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest response body accepted from the network, in bytes.
    ///
    /// Set via ROAM_SW_MAX_BODY_BYTES environment variable.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Version suffix appended to every region name.
    ///
    /// Bumping it and re-activating drops every region from the previous version.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    #[serde(default = "default_shell_region_prefix")]
    pub shell_region_prefix: String,

    #[serde(default = "default_data_region_prefix")]
    pub data_region_prefix: String,

    /// Documents pre-populated into the shell region on install.
    #[serde(default = "default_shell_urls")]
    pub shell_urls: Vec<String>,

    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Path prefix under which `.json` requests are treated as data assets.
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,

    #[serde(default = "default_sitemap_path")]
    pub sitemap_path: String,

    /// JSON listing of blog posts used by the sitemap.
    #[serde(default = "default_content_listing_url")]
    pub content_listing_url: String,

    /// Data assets fetched on a `cacheData` control message.
    #[serde(default = "default_warm_urls")]
    pub warm_urls: Vec<String>,

    #[serde(default)]
    pub sitemap_date_policy: SitemapDatePolicy,

    #[serde(default = "default_sitemap_sections")]
    pub sitemap_sections: Vec<SectionEntry>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./roam-sw-cache.sqlite")
}

fn default_origin() -> String {
    "https://roamaxa.app".into()
}

fn default_user_agent() -> String {
    "roam-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_shell_region_prefix() -> String {
    "roam-ang-cache".into()
}

fn default_data_region_prefix() -> String {
    "roam-ang-data".into()
}

fn default_shell_urls() -> Vec<String> {
    vec!["/".into(), "/manifest.json".into()]
}

fn default_manifest_path() -> String {
    "/manifest.json".into()
}

fn default_data_prefix() -> String {
    "/jsonassets/".into()
}

fn default_sitemap_path() -> String {
    "/dynamic-sitemap.xml".into()
}

fn default_content_listing_url() -> String {
    "/jsonassets/content.json".into()
}

fn default_warm_urls() -> Vec<String> {
    vec!["/jsonassets/places.json".into(), "/jsonassets/events.json".into()]
}

fn default_sitemap_sections() -> Vec<SectionEntry> {
    vec![
        SectionEntry::new("/", "daily", "1.0"),
        SectionEntry::new("/#placesSection", "weekly", "0.9"),
        SectionEntry::new("/#eventsSection", "daily", "0.9"),
        SectionEntry::new("/#favoritesSection", "monthly", "0.7"),
        SectionEntry::new("/#downloadSection", "monthly", "0.6"),
        SectionEntry::new("/blog/", "weekly", "0.8"),
    ]
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            cache_version: default_cache_version(),
            shell_region_prefix: default_shell_region_prefix(),
            data_region_prefix: default_data_region_prefix(),
            shell_urls: default_shell_urls(),
            manifest_path: default_manifest_path(),
            data_prefix: default_data_prefix(),
            sitemap_path: default_sitemap_path(),
            content_listing_url: default_content_listing_url(),
            warm_urls: default_warm_urls(),
            sitemap_date_policy: SitemapDatePolicy::default(),
            sitemap_sections: default_sitemap_sections(),
        }
    }
}

impl WorkerConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the region holding the application shell.
    pub fn shell_region(&self) -> String {
        format!("{}-{}", self.shell_region_prefix, self.cache_version)
    }

    /// Name of the region holding JSON data assets.
    pub fn data_region(&self) -> String {
        format!("{}-{}", self.data_region_prefix, self.cache_version)
    }

    /// Regions that survive activation.
    pub fn allowed_regions(&self) -> [String; 2] {
        [self.shell_region(), self.data_region()]
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ROAM_SW_`
    /// 2. TOML file from `ROAM_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ROAM_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ROAM_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
