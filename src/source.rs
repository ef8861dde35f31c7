//! Catalog metadata source.
//!
//! The [`MetadataSource`] trait is the seam between the generation driver and
//! the remote catalog. The production implementation is [`TmdbClient`], a
//! blocking HTTP client for the TMDB v3 API. Tests drive the driver with a
//! mock source instead.
//!
//! ## Endpoints
//!
//! ```text
//! GET {base}/movie/popular?api_key&language&page   → list of movie summaries
//! GET {base}/tv/popular?api_key&language&page      → list of TV summaries
//! GET {base}/{movie|tv}/{id}?api_key&language
//!     &append_to_response=videos,credits,release_dates,content_ratings
//! ```
//!
//! No timeout is set on these requests, not even reqwest's 30 s default: a
//! stalled catalog stalls the run.

use crate::config::SourceConfig;
use crate::types::{ContentItem, MediaType};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {endpoint}")]
    Status {
        status: reqwest::StatusCode,
        endpoint: String,
    },
}

/// Remote catalog the driver reads from.
pub trait MetadataSource {
    /// One page of popular entries for a media type.
    fn popular(&self, media_type: MediaType, page: u32) -> Result<Vec<ContentItem>, SourceError>;

    /// Full detail record for one entry.
    fn detail(&self, media_type: MediaType, id: u64) -> Result<DetailRecord, SourceError>;
}

/// Fetch pages `1..=pages` of popular movies, then of popular TV.
///
/// A page that fails is logged and skipped; the rest of the catalog is still
/// returned.
pub fn fetch_catalog(source: &dyn MetadataSource, pages: u32) -> Vec<ContentItem> {
    let mut items = Vec::new();
    for media_type in MediaType::ALL {
        for page in 1..=pages {
            match source.popular(media_type, page) {
                Ok(batch) => items.extend(batch),
                Err(e) => error!(%media_type, page, error = %e, "failed to fetch catalog page"),
            }
        }
    }
    info!(count = items.len(), "downloaded catalog items");
    items
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
}

impl ListEntry {
    fn into_item(self, media_type: MediaType) -> ContentItem {
        let (title, date) = match media_type {
            MediaType::Movie => (self.title, self.release_date),
            MediaType::Tv => (self.name, self.first_air_date),
        };
        ContentItem {
            id: self.id,
            media_type,
            title: title.filter(|t| !t.is_empty()),
            release_date: date.filter(|d| !d.is_empty()),
        }
    }
}

/// Full detail record with the appended sub-resources the page needs.
///
/// Every field is optional on the wire; missing values fall back to
/// defaults so a sparse record still renders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailRecord {
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub runtime: Option<u32>,
    pub episode_run_time: Vec<u32>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genres: Vec<Genre>,
    pub credits: Credits,
    pub videos: Videos,
    pub release_dates: ReleaseDates,
    pub content_ratings: ContentRatings,
}

impl DetailRecord {
    /// Runtime in minutes: movie runtime, or the first episode length for TV.
    pub fn runtime_minutes(&self, media_type: MediaType) -> u32 {
        match media_type {
            MediaType::Movie => self.runtime.unwrap_or(0),
            MediaType::Tv => self.episode_run_time.first().copied().unwrap_or(0),
        }
    }

    pub fn published(&self, media_type: MediaType) -> Option<&str> {
        match media_type {
            MediaType::Movie => self.release_date.as_deref(),
            MediaType::Tv => self.first_air_date.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Videos {
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDates {
    pub results: Vec<CountryReleases>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryReleases {
    pub iso_3166_1: String,
    #[serde(default)]
    pub release_dates: Vec<Release>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Release {
    pub certification: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentRatings {
    pub results: Vec<CountryRating>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryRating {
    pub iso_3166_1: String,
    #[serde(default)]
    pub rating: String,
}

// ============================================================================
// TMDB client
// ============================================================================

/// Blocking TMDB v3 client.
pub struct TmdbClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            language: config.language.clone(),
        })
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&endpoint)
            .query(&[("api_key", &self.api_key), ("language", &self.language)])
            .query(extra)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status, endpoint });
        }
        Ok(response.json()?)
    }
}

impl MetadataSource for TmdbClient {
    fn popular(&self, media_type: MediaType, page: u32) -> Result<Vec<ContentItem>, SourceError> {
        let path = format!("/{}/popular", media_type.as_str());
        let list: ListResponse = self.get(&path, &[("page", page.to_string())])?;
        Ok(list
            .results
            .into_iter()
            .map(|entry| entry.into_item(media_type))
            .collect())
    }

    fn detail(&self, media_type: MediaType, id: u64) -> Result<DetailRecord, SourceError> {
        let path = format!("/{}/{}", media_type.as_str(), id);
        self.get(
            &path,
            &[(
                "append_to_response",
                "videos,credits,release_dates,content_ratings".to_string(),
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockSource;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn movie_entry_uses_title_and_release_date() {
        let entry: ListEntry = serde_json::from_str(
            r#"{"id": 42, "title": "Test! Movie", "release_date": "2021-05-01"}"#,
        )
        .unwrap();
        let item = entry.into_item(MediaType::Movie);
        assert_eq!(item.title.as_deref(), Some("Test! Movie"));
        assert_eq!(item.year(), "2021");
    }

    #[test]
    fn tv_entry_uses_name_and_first_air_date() {
        let entry: ListEntry = serde_json::from_str(
            r#"{"id": 1399, "name": "Game of Thrones", "first_air_date": "2011-04-17"}"#,
        )
        .unwrap();
        let item = entry.into_item(MediaType::Tv);
        assert_eq!(item.title.as_deref(), Some("Game of Thrones"));
        assert_eq!(item.year(), "2011");
    }

    #[test]
    fn empty_strings_become_none() {
        let entry: ListEntry =
            serde_json::from_str(r#"{"id": 1, "title": "", "release_date": ""}"#).unwrap();
        let item = entry.into_item(MediaType::Movie);
        assert_eq!(item.title, None);
        assert_eq!(item.year(), "NA");
    }

    #[test]
    fn sparse_detail_record_deserializes() {
        let detail: DetailRecord = serde_json::from_str(r#"{"overview": "x"}"#).unwrap();
        assert_eq!(detail.overview.as_deref(), Some("x"));
        assert!(detail.genres.is_empty());
        assert_eq!(detail.runtime_minutes(MediaType::Movie), 0);
    }

    #[test]
    fn tv_runtime_uses_first_episode_length() {
        let detail: DetailRecord =
            serde_json::from_str(r#"{"episode_run_time": [45, 60]}"#).unwrap();
        assert_eq!(detail.runtime_minutes(MediaType::Tv), 45);
    }

    #[test]
    fn fetch_catalog_reads_every_page_of_both_types() {
        let source = MockSource::new()
            .with_item(MediaType::Movie, 1, "One", Some("2020-01-01"))
            .with_item(MediaType::Tv, 2, "Two", None);

        let items = fetch_catalog(&source, 2);
        // The mock returns its items for page 1 only.
        assert_eq!(items.len(), 2);
        assert_eq!(source.popular_calls(), 4);
    }

    #[test]
    fn fetch_catalog_skips_failed_pages() {
        let source = MockSource::new()
            .with_item(MediaType::Tv, 2, "Two", None)
            .failing_popular(MediaType::Movie);

        let items = fetch_catalog(&source, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].media_type, MediaType::Tv);
    }

    /// Serve one HTTP response after `delay` on a local port.
    fn slow_server(delay: Duration, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            request
        });
        (base, handle)
    }

    fn client(base_url: String) -> TmdbClient {
        let config = SourceConfig {
            base_url,
            ..SourceConfig::default()
        };
        TmdbClient::new(&config, "k".into()).unwrap()
    }

    #[test]
    fn detail_request_carries_key_and_appended_sections() {
        let (base, server) = slow_server(Duration::ZERO, r#"{"overview": "Hello"}"#);
        let detail = client(base).detail(MediaType::Movie, 42).unwrap();
        assert_eq!(detail.overview.as_deref(), Some("Hello"));

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /movie/42?"));
        assert!(request.contains("api_key=k"));
        assert!(request.contains("append_to_response=videos%2Ccredits"));
    }

    #[test]
    #[ignore] // Waits 35s on a slow local server
    fn detail_waits_past_reqwest_default_timeout() {
        let (base, server) = slow_server(Duration::from_secs(35), r#"{"overview": "Late"}"#);
        let detail = client(base).detail(MediaType::Tv, 7).unwrap();
        assert_eq!(detail.overview.as_deref(), Some("Late"));
        server.join().unwrap();
    }
}
