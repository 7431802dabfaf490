//! Context window slicing.

use std::ops::Range;

use crate::api::{ContextWindow, NumberedLine};
use crate::lines::LineSequence;
use crate::{Error, Result};

/// Display number of the line at index 0.
pub const FIRST_LINE_NUMBER: usize = 1;

/// Slice context around `[start, end)` of `sequence`.
///
/// `before` covers `[start - context_size, start)`, `changed` covers
/// `[start, end)`, and `after` covers `[end, end + context_size)`, each clipped
/// to the sequence. An empty span (`start == end`) still yields context on
/// both sides of the insertion point.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] when `start > end` or `end` lies past the
/// end of the sequence.
pub fn window(
    sequence: &LineSequence,
    start: usize,
    end: usize,
    context_size: usize,
) -> Result<ContextWindow> {
    let len = sequence.len();
    if start > end || end > len {
        return Err(Error::MalformedInput { start, end, len });
    }

    let context_start = start.saturating_sub(context_size);
    let context_end = end.saturating_add(context_size).min(len);

    Ok(ContextWindow {
        before: numbered(sequence, context_start..start),
        changed: numbered(sequence, start..end),
        after: numbered(sequence, end..context_end),
    })
}

/// First `cap` and last `cap` lines of `sequence`, without overlap.
///
/// Used when a file has no differences. The head lands in `before` and the
/// tail in `after`; `changed` is always empty. Sequences of at most `2 * cap`
/// lines are shown whole.
#[must_use]
pub fn excerpt(sequence: &LineSequence, cap: usize) -> ContextWindow {
    let len = sequence.len();
    let head_end = cap.min(len);
    let tail_start = len.saturating_sub(cap).max(head_end);

    ContextWindow {
        before: numbered(sequence, 0..head_end),
        changed: Vec::new(),
        after: numbered(sequence, tail_start..len),
    }
}

fn numbered(sequence: &LineSequence, range: Range<usize>) -> Vec<NumberedLine> {
    let first = range.start;
    sequence
        .slice(range)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(offset, text)| NumberedLine::new(first + offset + FIRST_LINE_NUMBER, text.as_str()))
        .collect()
}
