//! Region classification between two line sequences.
//!
//! Alignment is delegated to `similar`'s patience diff. Its raw operations are
//! folded into maximal regions: every run of non-matching operations between
//! two matching runs becomes at most one `Removed` region followed by at most
//! one `Added` region, and touching matching runs are merged.

use std::ops::Range;

use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::api::{Region, RegionKind};
use crate::lines::LineSequence;

/// Classify every line of `before` and `after` into ordered regions.
///
/// The result partitions `[0, before.len())` and `[0, after.len())` without
/// gaps, never holds two adjacent regions of the same kind, and places a
/// `Removed` region before the `Added` region of the same change.
#[must_use]
pub fn classify(before: &LineSequence, after: &LineSequence) -> Vec<Region> {
    let ops = capture_diff_slices(Algorithm::Patience, before.as_slice(), after.as_slice());

    let mut regions = Vec::new();
    let mut pending: Option<(Range<usize>, Range<usize>)> = None;

    for op in &ops {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                flush_change(&mut regions, pending.take());
                push_unchanged(&mut regions, old, new);
            }
            DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                pending = Some(match pending {
                    Some((removed, added)) => (removed.start..old.end, added.start..new.end),
                    None => (old, new),
                });
            }
        }
    }
    flush_change(&mut regions, pending);

    tracing::trace!(
        before = before.len(),
        after = after.len(),
        regions = regions.len(),
        "classified regions"
    );
    regions
}

fn push_unchanged(regions: &mut Vec<Region>, old: Range<usize>, new: Range<usize>) {
    if old.is_empty() {
        return;
    }
    if let Some(last) = regions.last_mut() {
        if last.kind == RegionKind::Unchanged
            && last.before_end == old.start
            && last.after_end == new.start
        {
            last.before_end = old.end;
            last.after_end = new.end;
            return;
        }
    }
    regions.push(Region::unchanged(old.start, new.start, old.len()));
}

fn flush_change(regions: &mut Vec<Region>, change: Option<(Range<usize>, Range<usize>)>) {
    let Some((removed, added)) = change else {
        return;
    };
    let insert_at = removed.end;
    if !removed.is_empty() {
        regions.push(Region::removed(removed, added.start));
    }
    if !added.is_empty() {
        regions.push(Region::added(insert_at, added));
    }
}
