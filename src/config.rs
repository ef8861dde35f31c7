//! Generator configuration.
//!
//! Non-secret settings live in `config.toml`; credentials come from the
//! environment. The file is sparse: stock defaults are serialized to a TOML
//! table and the user's file is merged on top, so a config only needs the
//! keys it changes. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! [source]
//! base_url = "https://api.themoviedb.org/3"
//! image_base = "https://image.tmdb.org/t/p"
//! language = "en-US"
//! pages = 10                 # Popular-list pages fetched per media type
//! # client_api_key = "..."   # Key exposed to pages; defaults to TMDB_API_KEY
//!
//! [[sites]]
//! domain = "https://example.com"
//! output_root = "./public_html"
//! authority_domain = "https://example.com"
//!
//! [analytics]
//! "https://example.com" = "G-XXXXXXX"
//!
//! [generate]
//! template = "template.html"
//! queue_file = "new_urls.txt"
//! ping = true
//! ping_url = "http://pingomatic.com/ping/"
//!
//! [promo]
//! domain = ""                # Streaming site linked from the call to action
//! name = ""
//!
//! [indexing]
//! max_urls = 200
//! endpoint = "https://indexing.googleapis.com/v3/urlNotifications:publish"
//! scope = "https://www.googleapis.com/auth/indexing"
//! ```
//!
//! ## Environment
//!
//! - `TMDB_API_KEY`: metadata source key, required by `generate`.
//! - `GOOGLE_INDEXING_JSON`: service account JSON, required by `submit`.
//!
//! A `.env` file in the working directory is loaded before either is read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_KEY_VAR: &str = "TMDB_API_KEY";
pub const CREDENTIAL_VAR: &str = "GOOGLE_INDEXING_JSON";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Everything `config.toml` can hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub sites: Vec<TargetSite>,
    /// Authority domain → GA4 measurement id.
    pub analytics: BTreeMap<String, String>,
    pub generate: GenerateConfig,
    pub promo: PromoConfig,
    pub indexing: IndexingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            sites: vec![TargetSite {
                domain: "https://example.com".to_string(),
                output_root: PathBuf::from("./public_html"),
                authority_domain: "https://example.com".to_string(),
            }],
            analytics: BTreeMap::new(),
            generate: GenerateConfig::default(),
            promo: PromoConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sites.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[sites]] entry is required".into(),
            ));
        }
        for site in &self.sites {
            for (key, value) in [
                ("domain", &site.domain),
                ("authority_domain", &site.authority_domain),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "sites.{key} must not be empty"
                    )));
                }
                if value.ends_with('/') {
                    return Err(ConfigError::Validation(format!(
                        "sites.{key} must not end with '/': {value}"
                    )));
                }
            }
        }
        if self.source.pages == 0 {
            return Err(ConfigError::Validation(
                "source.pages must be at least 1".into(),
            ));
        }
        if self.indexing.max_urls == 0 {
            return Err(ConfigError::Validation(
                "indexing.max_urls must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// GA4 id for a site, only when the site is its own authority.
    pub fn analytics_id(&self, site: &TargetSite) -> Option<&str> {
        if !site.is_authority() {
            return None;
        }
        self.analytics
            .get(&site.authority_domain)
            .map(String::as_str)
    }
}

/// Metadata source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    pub image_base: String,
    pub language: String,
    /// Popular-list pages fetched per media type.
    pub pages: u32,
    /// Key substituted into `{{API_KEY}}` for the front-end scripts.
    /// Falls back to the fetch key when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
            language: "en-US".to_string(),
            pages: 10,
            client_api_key: None,
        }
    }
}

/// One published copy of the generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSite {
    /// Public origin of this copy, e.g. `https://example.com`.
    pub domain: String,
    /// Directory the site is written into. Must already exist.
    pub output_root: PathBuf,
    /// Origin of the canonical copy; equal to `domain` for the authority site.
    pub authority_domain: String,
}

impl TargetSite {
    /// The authority site is the only one that injects analytics, pings,
    /// and queues URLs for indexing.
    pub fn is_authority(&self) -> bool {
        self.domain == self.authority_domain
    }

    /// `domain` without scheme or trailing slash, for display text.
    pub fn clean_domain(&self) -> &str {
        strip_scheme(&self.domain)
    }

    pub fn clean_authority(&self) -> &str {
        strip_scheme(&self.authority_domain)
    }
}

fn strip_scheme(url: &str) -> &str {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_matches('/')
}

/// Generation driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Page template with `{{PLACEHOLDER}}` markers.
    pub template: PathBuf,
    /// Pending-notification queue shared with `submit`.
    pub queue_file: PathBuf,
    /// Send a discovery ping for each new authority page.
    pub ping: bool,
    pub ping_url: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("template.html"),
            queue_file: PathBuf::from("new_urls.txt"),
            ping: true,
            ping_url: "http://pingomatic.com/ping/".to_string(),
        }
    }
}

/// Call-to-action target appended to every overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromoConfig {
    /// Origin of the streaming site; empty disables the call to action.
    pub domain: String,
    pub name: String,
}

/// Indexing API settings for `submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexingConfig {
    /// URLs submitted per run; the rest of the queue is dropped.
    pub max_urls: usize,
    pub endpoint: String,
    pub scope: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_urls: 200,
            endpoint: "https://indexing.googleapis.com/v3/urlNotifications:publish".to_string(),
            scope: "https://www.googleapis.com/auth/indexing".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `[[sites]]` list replaces the stock one rather than extending it.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load config from a TOML file, merged over stock defaults.
///
/// A missing file yields the stock defaults; an unreadable or invalid file
/// is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = if path.exists() {
        let content = fs::read_to_string(path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        merge_toml(base, overlay)
    } else {
        base
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Read a required secret from the environment.
///
/// Empty values count as unset.
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Marquee Configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Secrets are read from the environment (or a .env file):
#   TMDB_API_KEY          metadata source key (generate)
#   GOOGLE_INDEXING_JSON  service account JSON (submit)

# ---------------------------------------------------------------------------
# Metadata source
# ---------------------------------------------------------------------------
[source]
base_url = "https://api.themoviedb.org/3"
image_base = "https://image.tmdb.org/t/p"
language = "en-US"
# Popular-list pages fetched for movies and for TV.
pages = 10
# Key written into {{API_KEY}} for client-side scripts.
# Omit to reuse TMDB_API_KEY.
# client_api_key = ""

# ---------------------------------------------------------------------------
# Target sites. A site whose domain equals its authority_domain is the
# authority: it gets analytics, pings, and queues new URLs for indexing.
# Other sites are satellites mirroring the same pages.
# ---------------------------------------------------------------------------
[[sites]]
domain = "https://example.com"
output_root = "./public_html"
authority_domain = "https://example.com"

# ---------------------------------------------------------------------------
# GA4 measurement ids, keyed by authority domain.
# ---------------------------------------------------------------------------
[analytics]
# "https://example.com" = "G-XXXXXXXXXX"

# ---------------------------------------------------------------------------
# Generation
# ---------------------------------------------------------------------------
[generate]
template = "template.html"
queue_file = "new_urls.txt"
ping = true
ping_url = "http://pingomatic.com/ping/"

# ---------------------------------------------------------------------------
# Call to action appended to every overview. Empty domain disables it.
# ---------------------------------------------------------------------------
[promo]
domain = ""
name = ""

# ---------------------------------------------------------------------------
# Indexing API submission
# ---------------------------------------------------------------------------
[indexing]
# URLs submitted per run. Anything past this in the queue is dropped.
max_urls = 200
endpoint = "https://indexing.googleapis.com/v3/urlNotifications:publish"
scope = "https://www.googleapis.com/auth/indexing"
"##
}
