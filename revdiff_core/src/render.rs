//! Text rendering of compared files.
//!
//! Every line of content is prefixed with a one-character marker and a
//! right-aligned 1-based line number, so reports stay aligned regardless of
//! file length:
//!
//! ```text
//! === notes.txt [edit] (+1 -0) ===
//! @@ added: before 3-2 -> after 3-3 @@
//!   before:
//!         1: a
//!         2: b
//!   after:
//!         1: a
//!         2: b
//!   +     3: c
//! ```

use std::fmt;

use crate::api::{ContextWindow, NumberedLine, RevisionPair};
use crate::file::{ChangedFile, ComparisonView, FileBody, RegionBlock};

/// Default width of the line-number column.
pub const DEFAULT_LINE_NUMBER_WIDTH: usize = 6;

const CONTEXT_MARKER: char = ' ';
const BEFORE_MARKER: char = '-';
const AFTER_MARKER: char = '+';
const INDENT: &str = "  ";

/// Renders compared files into a deterministic text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRenderer {
    line_number_width: usize,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_NUMBER_WIDTH)
    }
}

impl ReportRenderer {
    /// Renderer that right-aligns line numbers to `line_number_width` columns.
    #[must_use]
    pub const fn new(line_number_width: usize) -> Self {
        Self { line_number_width }
    }

    /// Render `files` in order, one section per file.
    #[must_use]
    pub fn render(&self, files: &[ChangedFile]) -> String {
        files
            .iter()
            .map(|file| self.render_file(file))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render a single file section.
    #[must_use]
    pub fn render_file(&self, file: &ChangedFile) -> String {
        FileSection {
            renderer: self,
            file,
        }
        .to_string()
    }

    /// Opening line summarizing the comparison and the page shown.
    #[must_use]
    pub fn summary(
        &self,
        pair: &RevisionPair,
        total: usize,
        skip: usize,
        shown: usize,
    ) -> String {
        if shown == 0 {
            return format!(
                "Comparing {pair}: {total} changed file(s), none in the requested page (skip {skip})\n"
            );
        }
        format!(
            "Comparing {pair}: {total} changed file(s), showing {}-{}\n",
            skip + 1,
            skip + shown
        )
    }

    /// Report body when the change list is empty.
    #[must_use]
    pub fn no_differences(&self, pair: &RevisionPair) -> String {
        format!("No differences found between {} and {}.\n", pair.base, pair.head)
    }

    /// Report body when the revision pair could not be resolved.
    #[must_use]
    pub fn no_iterations(&self, pair: &RevisionPair, detail: &str) -> String {
        format!("No iterations found for {pair}: {detail}\n")
    }

    /// Trailing note appended when generation was cancelled.
    #[must_use]
    pub fn truncation_note(&self, processed: usize, total: usize) -> String {
        format!(
            "[report truncated: processed {processed} of {total} file(s) before cancellation]\n"
        )
    }

    fn write_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        marker: char,
        line: &NumberedLine,
    ) -> fmt::Result {
        writeln!(
            f,
            "{INDENT}{marker}{number:>width$}: {text}",
            number = line.number,
            width = self.line_number_width,
            text = line.text,
        )
    }

    fn write_window(
        &self,
        f: &mut fmt::Formatter<'_>,
        label: &str,
        window: &ContextWindow,
        changed_marker: char,
    ) -> fmt::Result {
        if window.is_empty() {
            return Ok(());
        }
        writeln!(f, "{INDENT}{label}:")?;
        for line in &window.before {
            self.write_line(f, CONTEXT_MARKER, line)?;
        }
        for line in &window.changed {
            self.write_line(f, changed_marker, line)?;
        }
        for line in &window.after {
            self.write_line(f, CONTEXT_MARKER, line)?;
        }
        Ok(())
    }

    fn write_block(&self, f: &mut fmt::Formatter<'_>, block: &RegionBlock) -> fmt::Result {
        let region = &block.region;
        writeln!(
            f,
            "@@ {kind}: before {}-{} -> after {}-{} @@",
            region.before_start + 1,
            region.before_end,
            region.after_start + 1,
            region.after_end,
            kind = region.kind,
        )?;
        self.write_window(f, "before", &block.before, BEFORE_MARKER)?;
        self.write_window(f, "after", &block.after, AFTER_MARKER)
    }

    fn write_excerpt(&self, f: &mut fmt::Formatter<'_>, excerpt: &ContextWindow) -> fmt::Result {
        writeln!(f, "{INDENT}no content changes")?;
        for line in &excerpt.before {
            self.write_line(f, CONTEXT_MARKER, line)?;
        }
        let last_head = excerpt.before.last().map_or(0, |line| line.number);
        if excerpt
            .after
            .first()
            .is_some_and(|line| line.number > last_head + 1)
        {
            writeln!(
                f,
                "{INDENT}{CONTEXT_MARKER}{:>width$}",
                "...",
                width = self.line_number_width
            )?;
        }
        for line in &excerpt.after {
            self.write_line(f, CONTEXT_MARKER, line)?;
        }
        Ok(())
    }
}

struct FileSection<'a> {
    renderer: &'a ReportRenderer,
    file: &'a ChangedFile,
}

impl fmt::Display for FileSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = &self.file.entry;
        write!(f, "=== {} [{}]", entry.path, entry.change_type)?;
        if let Some(from) = &entry.renamed_from {
            write!(f, " (renamed from {from})")?;
        }
        if let Some(stats) = self.file.stats() {
            write!(f, " (+{} -{})", stats.added, stats.removed)?;
        }
        writeln!(f, " ===")?;

        match &self.file.body {
            FileBody::HeaderOnly => Ok(()),
            FileBody::FetchFailed { message } => {
                writeln!(f, "{INDENT}! content unavailable: {message}")
            }
            FileBody::Compared { view, .. } => match view {
                ComparisonView::Blocks(blocks) if blocks.is_empty() => {
                    writeln!(f, "{INDENT}(no lines on either side)")
                }
                ComparisonView::Blocks(blocks) => blocks
                    .iter()
                    .try_for_each(|block| self.renderer.write_block(f, block)),
                ComparisonView::Excerpt(excerpt) => self.renderer.write_excerpt(f, excerpt),
            },
        }
    }
}
