//! Per-site search index.
//!
//! Each site keeps a `search_index.json` at its root: a flat JSON array of
//! [`IndexRecord`]s that the front-end search script loads to resolve titles
//! to local pages.
//!
//! # Lifecycle
//!
//! The store is loaded in full when a site's processing starts, mutated in
//! memory while items are processed, and written back whole (overwriting) at
//! the end. There is no partial persistence: a crash mid-run loses that run's
//! index updates, while pages and queue entries already on disk stay.
//!
//! Every processed item is upserted, including items whose page already
//! exists, so the index reflects the latest slug and folder of every entry
//! ever seen rather than only the ones rendered this run.

use crate::types::IndexRecord;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Name of the index file within a site root.
pub const INDEX_FILENAME: &str = "search_index.json";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory view of one site's search index, keyed by `<type>_<id>`.
#[derive(Debug)]
pub struct IndexStore {
    path: PathBuf,
    records: HashMap<String, IndexRecord>,
    /// First-seen order of keys, so saves are stable across runs.
    order: Vec<String>,
}

impl IndexStore {
    /// Empty store that will save to `<root>/search_index.json`.
    pub fn empty(root: &Path) -> Self {
        Self {
            path: root.join(INDEX_FILENAME),
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Load from a site root. A missing file yields an empty store; an
    /// unreadable or malformed file is logged and also yields an empty store,
    /// so one corrupt index never blocks page generation.
    pub fn load(root: &Path) -> Self {
        let mut store = Self::empty(root);
        match read_records(&store.path) {
            Ok(Some(records)) => {
                for record in records {
                    store.upsert(record);
                }
                debug!(path = %store.path.display(), count = store.len(), "loaded search index");
            }
            Ok(None) => {}
            Err(e) => {
                error!(path = %store.path.display(), error = %e, "could not read search index, starting empty");
            }
        }
        store
    }

    /// Insert or overwrite the record for its key.
    pub fn upsert(&mut self, record: IndexRecord) {
        let key = record.key();
        if !self.records.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &str) -> Option<&IndexRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.order.iter().filter_map(|k| self.records.get(k))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole store back as a JSON array, replacing the file.
    pub fn save(&self) -> Result<(), IndexError> {
        let records: Vec<&IndexRecord> = self.records().collect();
        let json = serde_json::to_string(&records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Option<Vec<IndexRecord>>, IndexError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaType;
    use tempfile::TempDir;

    fn record(media_type: MediaType, id: u64, slug: &str) -> IndexRecord {
        IndexRecord {
            id,
            slug: slug.into(),
            media_type,
            folder: media_type.folder().into(),
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::load(tmp.path());
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let tmp = TempDir::new().unwrap();
        let mut store = IndexStore::empty(tmp.path());
        store.upsert(record(MediaType::Movie, 42, "test-movie-2021"));
        store.upsert(record(MediaType::Tv, 42, "some-show-2019"));
        store.save().unwrap();

        let loaded = IndexStore::load(tmp.path());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("movie_42").unwrap().slug, "test-movie-2021");
        assert_eq!(loaded.get("tv_42").unwrap().folder, "tvshows");
    }

    #[test]
    fn upsert_overwrites_same_key() {
        let tmp = TempDir::new().unwrap();
        let mut store = IndexStore::empty(tmp.path());
        store.upsert(record(MediaType::Movie, 1, "old-2020"));
        store.upsert(record(MediaType::Movie, 1, "new-2020"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("movie_1").unwrap().slug, "new-2020");
    }

    #[test]
    fn saved_file_is_a_json_array() {
        let tmp = TempDir::new().unwrap();
        let mut store = IndexStore::empty(tmp.path());
        store.upsert(record(MediaType::Movie, 42, "test-movie-2021"));
        store.save().unwrap();

        let raw = std::fs::read_to_string(tmp.path().join(INDEX_FILENAME)).unwrap();
        assert_eq!(
            raw,
            r#"[{"id":42,"slug":"test-movie-2021","type":"movie","folder":"movies"}]"#
        );
    }

    #[test]
    fn order_is_first_seen() {
        let tmp = TempDir::new().unwrap();
        let mut store = IndexStore::empty(tmp.path());
        store.upsert(record(MediaType::Tv, 2, "b"));
        store.upsert(record(MediaType::Movie, 1, "a"));
        store.upsert(record(MediaType::Tv, 2, "b2"));
        let slugs: Vec<&str> = store.records().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b2", "a"]);
    }

    #[test]
    fn corrupt_index_starts_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(INDEX_FILENAME), "{not json").unwrap();
        let store = IndexStore::load(tmp.path());
        assert!(store.is_empty());
    }
}
