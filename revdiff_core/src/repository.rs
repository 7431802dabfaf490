//! Git-backed change-list and content sources built on top of libgit2.

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use git2::{
    Delta, DiffDelta, DiffFindOptions, ErrorClass, ErrorCode, Repository as GitRepository, Tree,
};
use revdiff_source_api::{ChangeListProvider, ContentFetcher, SourceError, SourceResult};
use tracing::debug;

use crate::{
    api::{ChangeEntry, ChangeType, RevisionPair},
    Error, Result,
};

/// Handle to a local repository answering change-list and content queries.
///
/// libgit2 handles are not `Sync`, so the handle is kept behind a mutex and
/// can be shared by the report worker pool.
pub struct Repository {
    inner: Mutex<GitRepository>,
}

impl Repository {
    /// Open a repository from the given filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, does not resolve
    /// to a git repository, or if libgit2 reports an unsupported repository
    /// layout (such as a bare repository).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        if repo.workdir().is_none() {
            return Err(Error::BareRepository {
                path: display_path(&canonical),
            });
        }

        Ok(Self {
            inner: Mutex::new(repo),
        })
    }

    fn lock(&self) -> MutexGuard<'_, GitRepository> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChangeListProvider for Repository {
    fn list_changes(&self, pair: &RevisionPair) -> SourceResult<Vec<ChangeEntry>> {
        let repo = self.lock();
        let base = resolve_tree(&repo, &pair.base)?;
        let head = resolve_tree(&repo, &pair.head)?;

        let mut diff = repo
            .diff_tree_to_tree(Some(&base), Some(&head), None)
            .map_err(git_failure)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find)).map_err(git_failure)?;

        let entries = diff
            .deltas()
            .map(|delta| delta_entry(&delta))
            .collect::<SourceResult<Vec<_>>>()?;
        debug!(%pair, files = entries.len(), "listed changes from git");
        Ok(entries)
    }
}

impl ContentFetcher for Repository {
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
        let repo = self.lock();
        let tree = resolve_tree(&repo, revision)?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(git_failure(err)),
        };
        let object = entry.to_object(&repo).map_err(git_failure)?;
        let Some(blob) = object.as_blob() else {
            return Err(SourceError::Unsupported {
                reason: format!("{path} at {revision} is not a file"),
            });
        };

        String::from_utf8(blob.content().to_vec())
            .map(Some)
            .map_err(|_| SourceError::Unsupported {
                reason: format!("{path} at {revision} is not valid UTF-8 text"),
            })
    }
}

fn resolve_tree<'repo>(repo: &'repo GitRepository, revision: &str) -> SourceResult<Tree<'repo>> {
    let object = match repo.revparse_single(revision) {
        Ok(object) => object,
        Err(err) if matches!(err.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
            return Err(SourceError::not_found(format!("revision {revision}")))
        }
        Err(err) => return Err(git_failure(err)),
    };
    object.peel_to_tree().map_err(git_failure)
}

fn delta_entry(delta: &DiffDelta<'_>) -> SourceResult<ChangeEntry> {
    let new_path = delta_path(delta.new_file().path())?;
    let old_path = delta_path(delta.old_file().path())?;

    Ok(match delta.status() {
        Delta::Added => ChangeEntry::new(new_path, ChangeType::Add),
        Delta::Deleted => ChangeEntry::new(old_path, ChangeType::Delete),
        Delta::Renamed => ChangeEntry::renamed(new_path, old_path),
        _ => ChangeEntry::new(new_path, ChangeType::Edit),
    })
}

fn delta_path(path: Option<&Path>) -> SourceResult<String> {
    let path = path.ok_or_else(|| SourceError::message("diff delta without a path"))?;
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| SourceError::Unsupported {
            reason: format!("path {} is not valid UTF-8", path.display()),
        })
}

fn git_failure(err: git2::Error) -> SourceError {
    SourceError::message(err.message().to_owned())
}

fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}
