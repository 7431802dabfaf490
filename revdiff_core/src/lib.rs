//! Core library for revdiff's revision comparison reports.
//!
//! The crate is layered around four responsibilities:
//! - splitting snapshots into lines and classifying changed regions
//! - slicing bounded context windows around each region
//! - rendering a deterministic, line-numbered text report
//! - orchestrating fetches, pagination, and cancellation per report

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Shared data models re-exported from `revdiff_api`.
pub mod api;
/// Region classification between two line sequences.
pub mod classify;
/// Per-file comparison results handed to the renderer.
pub mod file;
/// Line splitting of raw snapshots.
pub mod lines;
/// Tracing subscriber setup.
pub mod logging;
/// Report generation over a change list.
pub mod pipeline;
/// Text rendering of compared files.
pub mod render;
/// Git repository access backing the change-list and content sources.
pub mod repository;
/// Context window slicing.
pub mod window;

pub use api::*;
pub use classify::classify;
pub use file::{ChangedFile, ComparisonView, FileBody, RegionBlock};
pub use lines::{split, LineSequence};
pub use pipeline::{
    generate_report, generate_report_for, CancellationToken, FileFailure, Report, ReportOptions,
    ReportOutcome,
};
pub use render::ReportRenderer;
pub use revdiff_source_api::{ChangeListProvider, ContentFetcher, SourceError, SourceResult};
pub use revdiff_sources::{CommandFetcher, MemorySource};
pub use window::{excerpt, window};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A window was requested outside the bounds of its line sequence.
    ///
    /// This indicates a classifier bug rather than an external failure.
    #[error("window [{start}, {end}) is outside a sequence of {len} lines")]
    MalformedInput {
        /// Requested start index.
        start: usize,
        /// Requested end index (exclusive).
        end: usize,
        /// Length of the sequence.
        len: usize,
    },
    /// The change-list source failed for a reason other than a missing revision.
    #[error("failed to list changes: {source}")]
    ChangeList {
        /// Error reported by the source.
        #[source]
        source: revdiff_source_api::SourceError,
    },
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Bare repositories are currently unsupported.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
    /// Report options could not be parsed.
    #[error("invalid report options in {path}: {source}")]
    Config {
        /// File the options were read from.
        path: String,
        /// Parse error reported by `toml`.
        #[source]
        source: toml::de::Error,
    },
}
