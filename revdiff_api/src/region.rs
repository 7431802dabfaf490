use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Classification of a region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Lines identical on both sides.
    Unchanged,
    /// Lines present only in the after snapshot.
    Added,
    /// Lines present only in the before snapshot.
    Removed,
}

impl RegionKind {
    /// Lowercase label used in rendered reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A maximal span of lines expressed in both coordinate spaces.
///
/// All offsets are 0-based and half-open. `Added` regions are empty on the
/// before axis, `Removed` regions are empty on the after axis, and
/// `Unchanged` regions have equal length on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Classification of the span.
    pub kind: RegionKind,
    /// First before-line index (inclusive).
    pub before_start: usize,
    /// Last before-line index (exclusive).
    pub before_end: usize,
    /// First after-line index (inclusive).
    pub after_start: usize,
    /// Last after-line index (exclusive).
    pub after_end: usize,
}

impl Region {
    /// Unchanged span of `len` lines starting at the given offsets.
    pub const fn unchanged(before_start: usize, after_start: usize, len: usize) -> Self {
        Self {
            kind: RegionKind::Unchanged,
            before_start,
            before_end: before_start + len,
            after_start,
            after_end: after_start + len,
        }
    }

    /// Lines `after` inserted at before-offset `at`.
    pub const fn added(at: usize, after: Range<usize>) -> Self {
        Self {
            kind: RegionKind::Added,
            before_start: at,
            before_end: at,
            after_start: after.start,
            after_end: after.end,
        }
    }

    /// Lines `before` removed at after-offset `at`.
    pub const fn removed(before: Range<usize>, at: usize) -> Self {
        Self {
            kind: RegionKind::Removed,
            before_start: before.start,
            before_end: before.end,
            after_start: at,
            after_end: at,
        }
    }

    /// Span on the before axis.
    pub const fn before_range(&self) -> Range<usize> {
        self.before_start..self.before_end
    }

    /// Span on the after axis.
    pub const fn after_range(&self) -> Range<usize> {
        self.after_start..self.after_end
    }

    /// Number of lines covered on the before axis.
    pub const fn before_len(&self) -> usize {
        self.before_end - self.before_start
    }

    /// Number of lines covered on the after axis.
    pub const fn after_len(&self) -> usize {
        self.after_end - self.after_start
    }

    /// Whether this region represents a change.
    pub const fn is_change(&self) -> bool {
        !matches!(self.kind, RegionKind::Unchanged)
    }
}

/// Added and removed line totals across a set of regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineStats {
    /// Lines present only in the after snapshot.
    pub added: usize,
    /// Lines present only in the before snapshot.
    pub removed: usize,
}

impl LineStats {
    /// A stats instance with nothing added or removed.
    pub const ZERO: Self = Self {
        added: 0,
        removed: 0,
    };

    /// Sum the changed lines of `regions`.
    pub fn from_regions(regions: &[Region]) -> Self {
        regions.iter().fold(Self::ZERO, |stats, region| match region.kind {
            RegionKind::Added => Self {
                added: stats.added + region.after_len(),
                ..stats
            },
            RegionKind::Removed => Self {
                removed: stats.removed + region.before_len(),
                ..stats
            },
            RegionKind::Unchanged => stats,
        })
    }
}

/// A line paired with its 1-based display number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedLine {
    /// 1-based line number.
    pub number: usize,
    /// Line text without the terminating newline.
    pub text: String,
}

impl NumberedLine {
    /// Convenience constructor.
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Context-before, changed span, and context-after slices for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Lines preceding the changed span.
    #[serde(default)]
    pub before: Vec<NumberedLine>,
    /// The changed span itself.
    #[serde(default)]
    pub changed: Vec<NumberedLine>,
    /// Lines following the changed span.
    #[serde(default)]
    pub after: Vec<NumberedLine>,
}

impl ContextWindow {
    /// True when all three slices are empty.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.changed.is_empty() && self.after.is_empty()
    }

    /// Iterate every line in display order.
    pub fn lines(&self) -> impl Iterator<Item = &NumberedLine> + '_ {
        self.before
            .iter()
            .chain(self.changed.iter())
            .chain(self.after.iter())
    }
}
