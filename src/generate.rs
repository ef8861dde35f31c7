//! Incremental page generation.
//!
//! For every configured site and every catalog item, the driver decides
//! whether the item's page already exists. Existing pages are never fetched
//! or rendered again; new pages are rendered from the template, written, and,
//! on the authority site only, pinged and queued for indexing.
//!
//! ## Per-item steps
//!
//! 1. No title → the item is invalid and skipped silently.
//! 2. Resolve the slug and the `<type>_<id>` key.
//! 3. Upsert the item's [`IndexRecord`], whether or not a page gets written.
//! 4. `<root>/<folder>/<slug>.html` exists → skipped.
//! 5. Otherwise fetch the detail record, render, write.
//! 6. Authority site: ping (best effort) and append the canonical URL to the
//!    notification queue (best effort).
//!
//! ## Failure scopes
//!
//! - A missing template aborts the whole run before the catalog is fetched
//!   (see [`generate`]).
//! - An empty catalog aborts the whole run before any site is touched.
//! - A missing output root aborts that site only.
//! - A failed fetch, render, or write aborts that item only.
//! - Ping and queue failures are logged and do not undo the written page.
//!
//! ## Output Structure
//!
//! ```text
//! public_html/
//! ├── search_index.json
//! ├── movies/
//! │   └── test-movie-2021.html
//! └── tvshows/
//!     └── some-show-2019.html
//! ```

use crate::artifacts;
use crate::config::{Config, TargetSite};
use crate::fields::{self, PageContext};
use crate::index::IndexStore;
use crate::naming;
use crate::ping::DiscoveryPing;
use crate::queue::NotificationQueue;
use crate::render::{RenderError, Template};
use crate::source::{MetadataSource, SourceError, fetch_catalog};
use crate::types::{ContentItem, IndexRecord, MediaType};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("output directory not found: {0}")]
    MissingOutputRoot(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no catalog items fetched")]
    EmptyCatalog,
    #[error(transparent)]
    Template(#[from] RenderError),
}

/// Why a single item produced no page.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("detail fetch failed: {0}")]
    Source(#[from] SourceError),
    #[error("failed to write page {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of processing one item against one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No title; nothing recorded.
    Invalid,
    /// Page already on disk.
    Skipped,
    /// Page written; carries its canonical URL.
    Written(String),
}

/// Tally for one site.
#[derive(Debug, Clone, Default)]
pub struct SiteReport {
    pub domain: String,
    pub authority: bool,
    /// Canonical URLs of pages written this run.
    pub written: Vec<String>,
    pub skipped: usize,
    pub invalid: usize,
    pub failed: usize,
    /// URLs successfully appended to the notification queue.
    pub queued: usize,
    /// Records in the search index after the run.
    pub indexed: usize,
}

/// A site that could not be processed at all.
#[derive(Debug)]
pub struct AbortedSite {
    pub domain: String,
    pub error: GenerateError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub sites: Vec<SiteReport>,
    pub aborted: Vec<AbortedSite>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_written(&self) -> usize {
        self.sites.iter().map(|s| s.written.len()).sum()
    }
}

/// Full `generate` run: load the template, fetch the catalog, then process
/// every site. Nothing is fetched when the template is missing, and nothing is
/// written when the catalog comes back empty.
pub fn generate(
    config: &Config,
    source: &dyn MetadataSource,
    pinger: &dyn DiscoveryPing,
    client_api_key: String,
) -> Result<RunReport, GenerateError> {
    let template = Template::load(&config.generate.template)?;
    let items = fetch_catalog(source, config.source.pages);
    if items.is_empty() {
        return Err(GenerateError::EmptyCatalog);
    }
    Ok(Generator::new(config, source, pinger, template, client_api_key).run(&items))
}

/// Drives generation for every configured site.
pub struct Generator<'a> {
    config: &'a Config,
    source: &'a dyn MetadataSource,
    pinger: &'a dyn DiscoveryPing,
    queue: NotificationQueue,
    template: Template,
    client_api_key: String,
    rng: fastrand::Rng,
    today: NaiveDate,
}

impl<'a> Generator<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn MetadataSource,
        pinger: &'a dyn DiscoveryPing,
        template: Template,
        client_api_key: String,
    ) -> Self {
        Self {
            config,
            source,
            pinger,
            queue: NotificationQueue::new(&config.generate.queue_file),
            template,
            client_api_key,
            rng: fastrand::Rng::new(),
            today: chrono::Utc::now().date_naive(),
        }
    }

    /// Seed the promotional copy picker.
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Date stamped on the master sitemap.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Process every site in config order. A site that aborts is recorded
    /// and the next site still runs.
    pub fn run(&mut self, items: &[ContentItem]) -> RunReport {
        let started = Instant::now();
        let config = self.config;
        let mut report = RunReport::default();
        for site in &config.sites {
            info!(domain = %site.domain, authority = site.is_authority(), "processing site");
            match self.process_site(site, items) {
                Ok(site_report) => {
                    info!(
                        domain = %site.domain,
                        written = site_report.written.len(),
                        skipped = site_report.skipped,
                        failed = site_report.failed,
                        "finished site"
                    );
                    report.sites.push(site_report);
                }
                Err(e) => {
                    error!(domain = %site.domain, error = %e, "skipping site");
                    report.aborted.push(AbortedSite {
                        domain: site.domain.clone(),
                        error: e,
                    });
                }
            }
        }
        report.elapsed = started.elapsed();
        report
    }

    /// Generate one site: pages, then artifacts, then the search index.
    pub fn process_site(
        &mut self,
        site: &TargetSite,
        items: &[ContentItem],
    ) -> Result<SiteReport, GenerateError> {
        let root = &site.output_root;
        if !root.is_dir() {
            return Err(GenerateError::MissingOutputRoot(root.clone()));
        }
        for media_type in MediaType::ALL {
            fs::create_dir_all(root.join(media_type.folder()))?;
        }

        let config = self.config;
        let client_api_key = self.client_api_key.clone();
        let ctx = PageContext {
            site,
            analytics_id: config.analytics_id(site),
            client_api_key: &client_api_key,
            image_base: &config.source.image_base,
            promo: &config.promo,
        };

        let mut index = IndexStore::load(root);
        let mut report = SiteReport {
            domain: site.domain.clone(),
            authority: site.is_authority(),
            ..SiteReport::default()
        };

        for item in items {
            match self.process_item(item, &ctx, &mut index) {
                Ok(Outcome::Invalid) => report.invalid += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Ok(Outcome::Written(url)) => {
                    if site.is_authority() && self.notify(item, &url) {
                        report.queued += 1;
                    }
                    report.written.push(url);
                }
                Err(e) => {
                    error!(id = item.id, media_type = %item.media_type, error = %e, "failed to process item");
                    report.failed += 1;
                }
            }
        }

        artifacts::write_all(site, self.today);
        if let Err(e) = index.save() {
            error!(path = %index.path().display(), error = %e, "could not save search index");
        }
        report.indexed = index.len();
        Ok(report)
    }

    /// Steps 1–5 for one item. Notification is left to the caller.
    pub fn process_item(
        &mut self,
        item: &ContentItem,
        ctx: &PageContext,
        index: &mut IndexStore,
    ) -> Result<Outcome, ItemError> {
        let Some(title) = item.title.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(Outcome::Invalid);
        };

        let media_type = item.media_type;
        let slug = naming::resolve_slug(title, item.id, &item.year());
        index.upsert(IndexRecord {
            id: item.id,
            slug: slug.clone(),
            media_type,
            folder: media_type.folder().to_string(),
        });

        let output_path = ctx
            .site
            .output_root
            .join(media_type.folder())
            .join(format!("{slug}.html"));
        if output_path.exists() {
            debug!(slug = %slug, "page exists, skipping");
            return Ok(Outcome::Skipped);
        }

        let detail = self.source.detail(media_type, item.id)?;
        let fields = fields::page_fields(item, title, &slug, &detail, ctx, &mut self.rng);
        let html = self.template.render(&fields);
        fs::write(&output_path, html).map_err(|source| ItemError::Write {
            path: output_path.clone(),
            source,
        })?;
        info!(slug = %slug, domain = %ctx.site.domain, "wrote page");
        Ok(Outcome::Written(ctx.canonical_url(media_type, &slug)))
    }

    /// Ping and queue a new authority page. Returns whether it was queued.
    ///
    /// On the authority site the page URL and the canonical URL coincide.
    fn notify(&self, item: &ContentItem, url: &str) -> bool {
        let title = item.title.as_deref().unwrap_or_default();
        if let Err(e) = self.pinger.ping(title, url) {
            warn!(url, error = %e, "discovery ping failed");
        }
        match self.queue.append(url) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not queue URL for indexing");
                false
            }
        }
    }
}
