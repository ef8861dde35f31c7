//! # Marquee
//!
//! A static site generator for movie and TV catalog pages. The catalog comes
//! from the TMDB API; every popular title becomes one HTML page, written into
//! one or more sites that mirror each other. Pages are never rewritten once
//! they exist, so a daily run costs one detail fetch per new title.
//!
//! # Architecture: Two Independent Commands
//!
//! ```text
//! generate   catalog  →  <site>/movies/*.html, tvshows/*.html
//!                     →  <site>/search_index.json, sitemaps, robots.txt
//!                     →  new_urls.txt            (authority site only)
//!
//! submit     new_urls.txt  →  Indexing API  →  (file deleted)
//! ```
//!
//! The two commands share nothing but the queue file. They are meant to run
//! on separate schedules (for example `generate` nightly, `submit` an hour
//! later) and must never overlap: the queue is not locked.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | Per-site, per-item incremental generation |
//! | [`source`] | [`source::MetadataSource`] trait and the blocking TMDB client |
//! | [`fields`] | Detail record → placeholder values (trailer, certification, cast, JSON-LD) |
//! | [`render`] | Single-pass `{{NAME}}` template substitution |
//! | [`spintax`] | Varied promotional paragraph appended to overviews |
//! | [`naming`] | Title + year → URL slug |
//! | [`index`] | Per-site `search_index.json` load/upsert/save |
//! | [`artifacts`] | Folder sitemaps, master sitemap, robots.txt |
//! | [`ping`] | Best-effort discovery ping for new authority pages |
//! | [`queue`] | The `new_urls.txt` pending-notification queue |
//! | [`submit`] | Queue → Indexing API, capped, then cleared |
//! | [`auth`] | Service-account JWT-bearer token exchange |
//! | [`config`] | `config.toml` loading over stock defaults, env secrets |
//! | [`types`] | Shared types: media type, catalog item, index record |
//! | [`output`] | CLI summaries for each command |
//!
//! # Design Decisions
//!
//! ## The Page File Is the Cache
//!
//! Whether an item needs work is decided by one check: does
//! `<root>/<folder>/<slug>.html` exist. There is no manifest of rendered
//! pages to drift out of sync with the disk, and deleting a page by hand is
//! how a page gets regenerated.
//!
//! ## Authority and Satellites
//!
//! Every site is a [`config::TargetSite`]. A site whose domain equals its
//! authority domain is the authority; the others are satellites serving the
//! same pages with a canonical link back to the authority. Only the authority
//! carries analytics, sends discovery pings, and queues URLs for indexing, so
//! search engines are only ever asked to index one copy.
//!
//! ## Runtime Templates, Compile-Time Fragments
//!
//! The page shell is a user-supplied `template.html`, so a site's look can
//! change without a rebuild. The repeated fragments inside it (genre tags,
//! cast cards, the analytics snippet) are built with Maud so catalog text is
//! escaped.
//!
//! ## At-Most-Once Submission
//!
//! The submitter deletes the queue after one pass regardless of per-URL
//! results, and drops anything past the daily cap. Re-submitting is cheap to
//! arrange by hand; a queue that grows without bound is not.
//!
//! ## Sequential and Blocking
//!
//! Items are processed one at a time with blocking HTTP. Upstream rate limits,
//! not CPU, bound a run, and a single thread keeps the index and queue
//! writes trivially ordered.

pub mod artifacts;
pub mod auth;
pub mod config;
pub mod fields;
pub mod generate;
pub mod index;
pub mod naming;
pub mod output;
pub mod ping;
pub mod queue;
pub mod render;
pub mod source;
pub mod spintax;
pub mod submit;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
