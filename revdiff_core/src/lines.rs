//! Line splitting of raw snapshots.

use std::ops::Range;

/// Ordered, immutable, 0-indexed lines of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSequence {
    lines: Vec<String>,
}

impl LineSequence {
    /// A sequence with no lines, used when a snapshot has no content.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the sequence has no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Borrow the lines as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Line at `index`, if in bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lines in `range`, or `None` when the range leaves the sequence.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Option<&[String]> {
        self.lines.get(range)
    }
}

impl From<Vec<String>> for LineSequence {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// Split `text` into lines on `\n`.
///
/// A trailing `\n` terminates the last line instead of opening a new empty
/// one, so `"a\nb\n"` and `"a\nb"` both have two lines. The empty string is
/// the exception: it yields a single empty line. Carriage returns are kept.
#[must_use]
pub fn split(text: &str) -> LineSequence {
    if text.is_empty() {
        return LineSequence::from(vec![String::new()]);
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    LineSequence::from(body.split('\n').map(str::to_owned).collect::<Vec<_>>())
}
