use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Externally raised signal that stops a report generation early.
///
/// Clones share the same flag. Files already being processed finish; no new
/// fetches are issued once the token is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Rendered report text and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The full report.
    pub text: String,
    /// Files in the change list before pagination.
    pub total_files: usize,
    /// Files rendered into `text`.
    pub rendered_files: usize,
    /// Whether cancellation cut the page short.
    pub truncated: bool,
}

/// A file whose content could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Path of the affected file.
    pub path: String,
    /// Note embedded in the report for this file.
    pub message: String,
}

/// Result of a report generation that produced usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Every file in the page rendered without fetch failures.
    Complete(Report),
    /// At least one file degraded to an inline error note.
    Partial {
        /// The report, including the inline notes.
        report: Report,
        /// One entry per degraded file, in report order.
        failures: Vec<FileFailure>,
    },
}

impl ReportOutcome {
    pub(crate) fn new(report: Report, failures: Vec<FileFailure>) -> Self {
        if failures.is_empty() {
            Self::Complete(report)
        } else {
            Self::Partial { report, failures }
        }
    }

    /// The rendered report.
    #[must_use]
    pub const fn report(&self) -> &Report {
        match self {
            Self::Complete(report) | Self::Partial { report, .. } => report,
        }
    }

    /// Report text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.report().text
    }

    /// Whether any file degraded to an inline error note.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Files that degraded to inline notes.
    #[must_use]
    pub fn failures(&self) -> &[FileFailure] {
        match self {
            Self::Complete(_) => &[],
            Self::Partial { failures, .. } => failures,
        }
    }

    /// Consume the outcome, keeping only the report.
    #[must_use]
    pub fn into_report(self) -> Report {
        match self {
            Self::Complete(report) | Self::Partial { report, .. } => report,
        }
    }
}
