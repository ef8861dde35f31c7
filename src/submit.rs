//! Indexing submitter.
//!
//! Drains the notification queue written by `generate`: reads every pending
//! URL, submits at most `max_urls` of them to the Indexing API as
//! `URL_UPDATED` notifications, then deletes the queue file.
//!
//! ## Pass
//!
//! 1. Queue file missing or empty → nothing to do.
//! 2. Keep the first `max_urls` URLs; the rest are dropped.
//! 3. Obtain a bearer token. On failure stop here and leave the queue file
//!    untouched for the next run.
//! 4. Submit each URL, logging success or the response status.
//! 5. Delete the queue file, whatever the per-URL outcomes were.
//!
//! Delivery is at most once: a URL whose submission failed, or that fell past
//! the cap, is not retried.

use crate::auth::{AuthError, TokenProvider};
use crate::queue::{NotificationQueue, QueueError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Per-request limit for Indexing API calls. A stalled call fails that URL only.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("indexing API returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One notification as sent to the API.
#[derive(Debug, Serialize)]
pub struct UrlNotification<'a> {
    pub url: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl<'a> UrlNotification<'a> {
    pub fn updated(url: &'a str) -> Self {
        Self {
            url,
            kind: "URL_UPDATED",
        }
    }
}

/// The remote indexing service.
pub trait IndexingApi {
    fn publish(&self, token: &str, url: &str) -> Result<(), SubmitError>;
}

/// Google Indexing API `urlNotifications:publish`.
pub struct GoogleIndexing {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleIndexing {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SubmitError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl IndexingApi for GoogleIndexing {
    fn publish(&self, token: &str, url: &str) -> Result<(), SubmitError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&UrlNotification::updated(url))
            .send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(SubmitError::Rejected { status, body })
        }
    }
}

/// What one submitter pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// URLs found in the queue.
    pub pending: usize,
    pub submitted: usize,
    pub failed: usize,
    /// URLs past the cap, discarded with the queue file.
    pub dropped: usize,
    /// Whether the queue file was removed.
    pub cleared: bool,
}

/// Run one submitter pass over `queue`.
///
/// Returns `Err` only when the pass stopped before submitting, in which case
/// the queue file is left in place.
pub fn submit_pending(
    queue: &NotificationQueue,
    max_urls: usize,
    auth: &dyn TokenProvider,
    api: &dyn IndexingApi,
) -> Result<SubmitReport, SubmitError> {
    let urls = queue.pending()?;
    let mut report = SubmitReport {
        pending: urls.len(),
        ..SubmitReport::default()
    };
    if urls.is_empty() {
        info!(path = %queue.path().display(), "nothing queued for indexing");
        return Ok(report);
    }

    let batch = &urls[..urls.len().min(max_urls)];
    report.dropped = urls.len() - batch.len();
    if report.dropped > 0 {
        warn!(dropped = report.dropped, max_urls, "queue exceeds submission cap");
    }
    info!(count = batch.len(), "submitting URLs for indexing");

    let token = auth.access_token()?;

    for url in batch {
        match api.publish(&token, url) {
            Ok(()) => {
                info!(url = %url, "indexing notification accepted");
                report.submitted += 1;
            }
            Err(e) => {
                error!(url = %url, error = %e, "indexing notification failed");
                report.failed += 1;
            }
        }
    }

    queue.clear()?;
    report.cleared = true;
    Ok(report)
}
