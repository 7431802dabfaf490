//! Per-file comparison results handed to the renderer.

use crate::api::{ChangeEntry, ContextWindow, LineStats, Region};
use crate::classify::classify;
use crate::lines::LineSequence;
use crate::window::{excerpt, window};
use crate::Result;

/// One changed region together with its context on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBlock {
    /// The classified region.
    pub region: Region,
    /// Window over the before snapshot.
    pub before: ContextWindow,
    /// Window over the after snapshot.
    pub after: ContextWindow,
}

/// What the renderer shows for a compared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonView {
    /// One block per changed region, in document order.
    Blocks(Vec<RegionBlock>),
    /// The file has no differences; head and tail of the after snapshot.
    Excerpt(ContextWindow),
}

/// Body of a file section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    /// Content was not requested; only the header is rendered.
    HeaderOnly,
    /// Content could not be fetched; the message is rendered inline.
    FetchFailed {
        /// Human-readable failure description.
        message: String,
    },
    /// Both sides were fetched and compared.
    Compared {
        /// Every region of the file, unchanged ones included.
        regions: Vec<Region>,
        /// What to display.
        view: ComparisonView,
    },
}

/// A file touched by the revision comparison, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path and change type as enumerated by the change-list source.
    pub entry: ChangeEntry,
    /// Rendered body.
    pub body: FileBody,
}

impl ChangedFile {
    /// A file rendered without content.
    #[must_use]
    pub const fn header_only(entry: ChangeEntry) -> Self {
        Self {
            entry,
            body: FileBody::HeaderOnly,
        }
    }

    /// A file whose content could not be fetched.
    #[must_use]
    pub fn fetch_failed(entry: ChangeEntry, message: impl Into<String>) -> Self {
        Self {
            entry,
            body: FileBody::FetchFailed {
                message: message.into(),
            },
        }
    }

    /// Classify and window `before` against `after`.
    ///
    /// A file whose only region is a single unchanged span falls back to an
    /// excerpt of at most `fallback_cap` head and tail lines.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInput`] if a classified region does not
    /// fit its sequences.
    pub fn compare(
        entry: ChangeEntry,
        before: &LineSequence,
        after: &LineSequence,
        context_size: usize,
        fallback_cap: usize,
    ) -> Result<Self> {
        let regions = classify(before, after);

        let view = match regions.as_slice() {
            [only] if !only.is_change() => ComparisonView::Excerpt(excerpt(after, fallback_cap)),
            _ => ComparisonView::Blocks(
                regions
                    .iter()
                    .filter(|region| region.is_change())
                    .map(|region| {
                        Ok(RegionBlock {
                            region: *region,
                            before: window(
                                before,
                                region.before_start,
                                region.before_end,
                                context_size,
                            )?,
                            after: window(
                                after,
                                region.after_start,
                                region.after_end,
                                context_size,
                            )?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(Self {
            entry,
            body: FileBody::Compared { regions, view },
        })
    }

    /// Added and removed line totals, when the file was compared.
    #[must_use]
    pub fn stats(&self) -> Option<LineStats> {
        match &self.body {
            FileBody::Compared { regions, .. } => Some(LineStats::from_regions(regions)),
            FileBody::HeaderOnly | FileBody::FetchFailed { .. } => None,
        }
    }
}
