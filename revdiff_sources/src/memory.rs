use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use revdiff_api::{ChangeEntry, RevisionPair};
use revdiff_source_api::{ChangeListProvider, ContentFetcher, SourceError, SourceResult};

/// In-memory change lists and file snapshots.
///
/// Useful for embedders that already hold both snapshots, and for tests that
/// need to observe which fetches were issued.
#[derive(Debug, Default)]
pub struct MemorySource {
    changes: HashMap<RevisionPair, Vec<ChangeEntry>>,
    files: HashMap<(String, String), String>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fetch_log: Mutex<Vec<(String, String)>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the change list for `pair`.
    #[must_use]
    pub fn with_changes(mut self, pair: RevisionPair, entries: Vec<ChangeEntry>) -> Self {
        self.changes.insert(pair, entries);
        self
    }

    /// Store `text` as the content of `path` at `revision`.
    #[must_use]
    pub fn with_file(
        mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.files
            .insert((revision.into(), path.into()), text.into());
        self
    }

    /// Make every fetch of `path` fail with a transport error.
    #[must_use]
    pub fn with_failure(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(path.into(), message.into());
        self
    }

    /// Delay every fetch of `path` by `delay`.
    #[must_use]
    pub fn with_delay(mut self, path: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(path.into(), delay);
        self
    }

    /// `(path, revision)` pairs fetched so far, in call order.
    pub fn fetch_log(&self) -> Vec<(String, String)> {
        self.fetch_log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ChangeListProvider for MemorySource {
    fn list_changes(&self, pair: &RevisionPair) -> SourceResult<Vec<ChangeEntry>> {
        self.changes
            .get(pair)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("revision pair {pair}")))
    }
}

impl ContentFetcher for MemorySource {
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
        self.fetch_log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((path.to_owned(), revision.to_owned()));

        if let Some(delay) = self.delays.get(path) {
            thread::sleep(*delay);
        }
        if let Some(message) = self.failures.get(path) {
            return Err(SourceError::message(message.clone()));
        }

        Ok(self
            .files
            .get(&(revision.to_owned(), path.to_owned()))
            .cloned())
    }
}
