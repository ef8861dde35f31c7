//! Shared types used across generation, indexing, and submission.
//!
//! [`IndexRecord`] is serialized into each site's `search_index.json` and read
//! back by the front-end search script, so its field names are part of the
//! published site's contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of catalog entry the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Wire name, also used as the API path segment and index key prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Output folder under a site root.
    pub fn folder(self) -> &'static str {
        match self {
            MediaType::Movie => "movies",
            MediaType::Tv => "tvshows",
        }
    }

    /// Human label shown on the page.
    pub fn label(self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Tv => "TV Show",
        }
    }

    /// schema.org `@type` for the JSON-LD block.
    pub fn schema_type(self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Tv => "TVSeries",
        }
    }

    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Tv];
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry as listed by the metadata source.
///
/// Movies and TV shows name their title and date fields differently on the
/// wire (`title`/`release_date` vs `name`/`first_air_date`); the source client
/// normalizes both into this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: Option<String>,
    /// `YYYY-MM-DD`, or `None` when the source has no date.
    pub release_date: Option<String>,
}

impl ContentItem {
    /// Four-digit release year, or `NA` when the item has no usable date.
    pub fn year(&self) -> String {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
            .unwrap_or("NA")
            .to_string()
    }

    /// Index Store key: `<type>_<id>`.
    pub fn storage_key(&self) -> String {
        storage_key(self.media_type, self.id)
    }
}

pub fn storage_key(media_type: MediaType, id: u64) -> String {
    format!("{}_{}", media_type.as_str(), id)
}

/// One entry of a site's search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: u64,
    pub slug: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub folder: String,
}

impl IndexRecord {
    pub fn key(&self) -> String {
        storage_key(self.media_type, self.id)
    }
}
