mod types;

pub use types::{SourceError, SourceResult};

use revdiff_api::{ChangeEntry, RevisionPair};

/// Enumerates the files touched by a revision pair.
pub trait ChangeListProvider: Send + Sync {
    /// Return the changed files for `pair`.
    ///
    /// The order must be stable across repeated calls for the same pair so
    /// that pagination is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when the pair cannot be resolved
    /// (no iterations), or a transport error when the backend fails.
    fn list_changes(&self, pair: &RevisionPair) -> SourceResult<Vec<ChangeEntry>>;
}

/// Retrieves the raw text of a file at a given revision.
pub trait ContentFetcher: Send + Sync {
    /// Fetch `path` at `revision`.
    ///
    /// Returns `Ok(None)` when the file does not exist at that revision, which
    /// is expected for added and deleted files.
    ///
    /// # Errors
    ///
    /// Implementors surface transport, timeout, or unsupported-content
    /// failures. They must fail fast rather than block indefinitely.
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>>;
}

impl<T: ChangeListProvider + ?Sized> ChangeListProvider for &T {
    fn list_changes(&self, pair: &RevisionPair) -> SourceResult<Vec<ChangeEntry>> {
        (**self).list_changes(pair)
    }
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for &T {
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
        (**self).fetch(path, revision)
    }
}
