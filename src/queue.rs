//! Pending-notification queue.
//!
//! The only state shared between `generate` and `submit` is a plain text file
//! of canonical URLs, one per line. `generate` appends a line for every new
//! authority page; `submit` reads the file, submits up to its cap, and
//! deletes it. A missing file means nothing is pending.
//!
//! # Delivery
//!
//! At most once. URLs past the submission cap and URLs whose submission
//! failed are gone once the file is deleted.
//!
//! # Concurrency
//!
//! There is no locking. An append racing a delete can lose the appended
//! line, so `generate` and `submit` must run on schedules that never overlap.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("failed to append to queue {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
    #[error("failed to read queue {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to remove queue {path}: {source}")]
    Clear { path: PathBuf, source: io::Error },
}

/// Handle on the queue file. Cheap to construct; no I/O until used.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    path: PathBuf,
}

impl NotificationQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one URL and flush it to disk before returning.
    pub fn append(&self, url: &str) -> Result<(), QueueError> {
        let wrap = |source| QueueError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(wrap)?;
        writeln!(file, "{url}").map_err(wrap)?;
        file.sync_data().map_err(wrap)
    }

    /// All pending URLs, trimmed, blank lines dropped. Missing file → empty.
    pub fn pending(&self) -> Result<Vec<String>, QueueError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(QueueError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Delete the queue file. Already gone counts as success.
    pub fn clear(&self) -> Result<(), QueueError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(QueueError::Clear {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_has_nothing_pending() {
        let tmp = TempDir::new().unwrap();
        let queue = NotificationQueue::new(tmp.path().join("new_urls.txt"));
        assert!(queue.pending().unwrap().is_empty());
    }

    #[test]
    fn appends_accumulate_in_order() {
        let tmp = TempDir::new().unwrap();
        let queue = NotificationQueue::new(tmp.path().join("new_urls.txt"));
        queue.append("https://a.test/movies/x-2020.html").unwrap();
        queue.append("https://a.test/tvshows/y-2021.html").unwrap();

        let raw = fs::read_to_string(queue.path()).unwrap();
        assert_eq!(
            raw,
            "https://a.test/movies/x-2020.html\nhttps://a.test/tvshows/y-2021.html\n"
        );
        assert_eq!(queue.pending().unwrap().len(), 2);
    }

    #[test]
    fn appends_survive_a_new_handle() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new_urls.txt");
        NotificationQueue::new(&path).append("https://a.test/1").unwrap();
        NotificationQueue::new(&path).append("https://a.test/2").unwrap();
        assert_eq!(
            NotificationQueue::new(&path).pending().unwrap(),
            vec!["https://a.test/1", "https://a.test/2"]
        );
    }

    #[test]
    fn blank_lines_and_whitespace_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new_urls.txt");
        fs::write(&path, "  https://a.test/1  \n\n\r\nhttps://a.test/2\n").unwrap();
        let queue = NotificationQueue::new(&path);
        assert_eq!(
            queue.pending().unwrap(),
            vec!["https://a.test/1", "https://a.test/2"]
        );
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let queue = NotificationQueue::new(tmp.path().join("new_urls.txt"));
        queue.append("https://a.test/1").unwrap();
        queue.clear().unwrap();
        assert!(!queue.path().exists());
        queue.clear().unwrap();
    }
}
