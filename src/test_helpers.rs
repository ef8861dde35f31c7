//! Shared test doubles for the marquee test suite.
//!
//! Every network collaborator has a recording mock here so the driver and the
//! submitter can be exercised against a temp directory with no HTTP at all.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = site_config(tmp.path(), &[("https://king.test", "https://king.test")]);
//! let source = MockSource::new().with_detail(42, "An overview");
//! let pinger = MockPinger::default();
//!
//! let report = Generator::new(&config, &source, &pinger, template(), "key".into())
//!     .run(&items);
//! assert_eq!(pinger.pinged().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use crate::auth::{AuthError, TokenProvider};
use crate::config::{Config, GenerateConfig, TargetSite};
use crate::ping::{DiscoveryPing, PingError};
use crate::render::Template;
use crate::source::{DetailRecord, MetadataSource, SourceError};
use crate::submit::{IndexingApi, SubmitError};
use crate::types::{ContentItem, MediaType};

// =========================================================================
// Fixture setup
// =========================================================================

/// Config with one output root per `(domain, authority)` pair, each created
/// under `root`, and the queue file at `root/new_urls.txt`.
pub fn site_config(root: &Path, sites: &[(&str, &str)]) -> Config {
    let sites = sites
        .iter()
        .enumerate()
        .map(|(i, (domain, authority))| {
            let output_root = root.join(format!("site{i}"));
            std::fs::create_dir_all(&output_root).unwrap();
            TargetSite {
                domain: domain.to_string(),
                output_root,
                authority_domain: authority.to_string(),
            }
        })
        .collect();
    Config {
        sites,
        generate: GenerateConfig {
            queue_file: root.join("new_urls.txt"),
            ..GenerateConfig::default()
        },
        ..Config::default()
    }
}

/// Minimal page template touching a few placeholders.
pub fn template() -> Template {
    Template::from_string(
        "<html><head><title>{{TITLE}} ({{YEAR}})</title>\
         <link rel=\"canonical\" href=\"{{CANONICAL}}\">{{ANALYTICS}}</head>\
         <body><p>{{OVERVIEW}}</p><span>{{RATING}}</span></body></html>",
    )
}

fn not_found(endpoint: String) -> SourceError {
    SourceError::Status {
        status: reqwest::StatusCode::NOT_FOUND,
        endpoint,
    }
}

// =========================================================================
// Metadata source
// =========================================================================

/// Serves fixed catalog items on page 1 and canned detail records.
///
/// Unknown ids get an empty detail record rather than an error.
#[derive(Default)]
pub struct MockSource {
    items: Vec<ContentItem>,
    details: HashMap<u64, DetailRecord>,
    failing_popular: HashSet<MediaType>,
    failing_detail: HashSet<u64>,
    popular_calls: Mutex<usize>,
    detail_calls: Mutex<Vec<u64>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(
        mut self,
        media_type: MediaType,
        id: u64,
        title: &str,
        date: Option<&str>,
    ) -> Self {
        self.items.push(ContentItem {
            id,
            media_type,
            title: Some(title.to_string()),
            release_date: date.map(String::from),
        });
        self
    }

    pub fn with_detail(mut self, id: u64, overview: &str) -> Self {
        self.details.insert(
            id,
            DetailRecord {
                overview: Some(overview.to_string()),
                ..DetailRecord::default()
            },
        );
        self
    }

    pub fn failing_popular(mut self, media_type: MediaType) -> Self {
        self.failing_popular.insert(media_type);
        self
    }

    pub fn failing_detail(mut self, id: u64) -> Self {
        self.failing_detail.insert(id);
        self
    }

    pub fn popular_calls(&self) -> usize {
        *self.popular_calls.lock().unwrap()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.lock().unwrap().len()
    }
}

impl MetadataSource for MockSource {
    fn popular(&self, media_type: MediaType, page: u32) -> Result<Vec<ContentItem>, SourceError> {
        *self.popular_calls.lock().unwrap() += 1;
        if self.failing_popular.contains(&media_type) {
            return Err(not_found(format!("/{media_type}/popular")));
        }
        if page != 1 {
            return Ok(Vec::new());
        }
        Ok(self
            .items
            .iter()
            .filter(|i| i.media_type == media_type)
            .cloned()
            .collect())
    }

    fn detail(&self, media_type: MediaType, id: u64) -> Result<DetailRecord, SourceError> {
        self.detail_calls.lock().unwrap().push(id);
        if self.failing_detail.contains(&id) {
            return Err(not_found(format!("/{media_type}/{id}")));
        }
        Ok(self.details.get(&id).cloned().unwrap_or_default())
    }
}

// =========================================================================
// Discovery ping
// =========================================================================

/// Records every `(title, url)` it is asked to ping.
#[derive(Default)]
pub struct MockPinger {
    fail: bool,
    pinged: Mutex<Vec<(String, String)>>,
}

impl MockPinger {
    /// Records calls but reports every ping as rejected.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn pinged(&self) -> Vec<(String, String)> {
        self.pinged.lock().unwrap().clone()
    }
}

impl DiscoveryPing for MockPinger {
    fn ping(&self, title: &str, url: &str) -> Result<(), PingError> {
        self.pinged
            .lock()
            .unwrap()
            .push((title.to_string(), url.to_string()));
        if self.fail {
            Err(PingError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        } else {
            Ok(())
        }
    }
}

// =========================================================================
// Indexing
// =========================================================================

/// Records every `(token, url)` publish attempt, failing for chosen URLs.
#[derive(Default)]
pub struct MockIndexer {
    failing: HashSet<String>,
    published: Mutex<Vec<(String, String)>>,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

impl IndexingApi for MockIndexer {
    fn publish(&self, token: &str, url: &str) -> Result<(), SubmitError> {
        self.published
            .lock()
            .unwrap()
            .push((token.to_string(), url.to_string()));
        if self.failing.contains(url) {
            return Err(SubmitError::Rejected {
                status: reqwest::StatusCode::FORBIDDEN,
                body: "{\"error\":\"permission denied\"}".to_string(),
            });
        }
        Ok(())
    }
}

/// Hands out a fixed token, or fails as if no credential were configured.
pub struct StaticToken {
    token: Option<String>,
    requests: Mutex<usize>,
}

impl StaticToken {
    pub fn ok(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            requests: Mutex::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            token: None,
            requests: Mutex::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String, AuthError> {
        *self.requests.lock().unwrap() += 1;
        self.token.clone().ok_or(AuthError::MissingCredential)
    }
}
