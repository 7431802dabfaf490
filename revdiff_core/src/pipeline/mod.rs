//! Report generation over a change list.
//!
//! A page of the change list is selected before any content is fetched, then
//! a bounded pool of workers fetches and compares files. Results land in
//! per-index slots so the rendered order matches the change-list order no
//! matter which worker finishes first.

mod options;
mod outcome;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use revdiff_source_api::{ChangeListProvider, ContentFetcher, SourceResult};
use tracing::{debug, info, warn};

pub use options::ReportOptions;
pub use outcome::{CancellationToken, FileFailure, Report, ReportOutcome};

use crate::api::{ChangeEntry, RevisionPair};
use crate::file::{ChangedFile, FileBody};
use crate::lines::{split, LineSequence};
use crate::render::ReportRenderer;
use crate::{Error, Result};

/// Render a report for an already enumerated change list.
///
/// Only the page selected by `options.skip` and `options.top` is fetched.
/// Files whose content cannot be fetched degrade to an inline note and make
/// the outcome [`ReportOutcome::Partial`]. When `cancel` fires mid-run, the
/// files completed so far are rendered followed by a truncation note.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if comparing a file produced a region
/// outside its sequences.
pub fn generate_report(
    changes: &[ChangeEntry],
    fetcher: &dyn ContentFetcher,
    pair: &RevisionPair,
    options: &ReportOptions,
    cancel: &CancellationToken,
) -> Result<ReportOutcome> {
    let renderer = ReportRenderer::new(options.line_number_width);

    if changes.is_empty() {
        info!(%pair, "no differences between revisions");
        return Ok(ReportOutcome::Complete(Report {
            text: renderer.no_differences(pair),
            total_files: 0,
            rendered_files: 0,
            truncated: false,
        }));
    }

    let page = paginate(changes, options.skip, options.top);
    info!(
        %pair,
        total = changes.len(),
        page = page.len(),
        include_content = options.include_content,
        "generating report"
    );

    let mut files = Vec::with_capacity(page.len());
    for slot in process_page(page, fetcher, pair, options, cancel) {
        let Some(result) = slot else { break };
        files.push(result?);
    }
    let truncated = files.len() < page.len();

    let mut text = renderer.summary(pair, changes.len(), options.skip, page.len());
    if !files.is_empty() {
        text.push('\n');
        text.push_str(&renderer.render(&files));
    }
    if truncated {
        warn!(
            processed = files.len(),
            page = page.len(),
            "report generation cancelled"
        );
        text.push('\n');
        text.push_str(&renderer.truncation_note(files.len(), page.len()));
    }

    let failures: Vec<FileFailure> = files
        .iter()
        .filter_map(|file| match &file.body {
            FileBody::FetchFailed { message } => Some(FileFailure {
                path: file.entry.path.clone(),
                message: message.clone(),
            }),
            FileBody::HeaderOnly | FileBody::Compared { .. } => None,
        })
        .collect();

    info!(
        rendered = files.len(),
        failures = failures.len(),
        truncated,
        "report generated"
    );

    Ok(ReportOutcome::new(
        Report {
            text,
            total_files: changes.len(),
            rendered_files: files.len(),
            truncated,
        },
        failures,
    ))
}

/// Enumerate the change list for `pair` and render a report for it.
///
/// An unresolvable pair is not an error: the outcome is a complete report
/// stating that no iterations were found.
///
/// # Errors
///
/// Returns [`Error::ChangeList`] when the provider fails for any other reason,
/// plus everything [`generate_report`] can return.
pub fn generate_report_for(
    provider: &dyn ChangeListProvider,
    fetcher: &dyn ContentFetcher,
    pair: &RevisionPair,
    options: &ReportOptions,
    cancel: &CancellationToken,
) -> Result<ReportOutcome> {
    let changes = match provider.list_changes(pair) {
        Ok(changes) => changes,
        Err(err) if err.is_not_found() => {
            info!(%pair, error = %err, "revision pair could not be resolved");
            let renderer = ReportRenderer::new(options.line_number_width);
            return Ok(ReportOutcome::Complete(Report {
                text: renderer.no_iterations(pair, &err.to_string()),
                total_files: 0,
                rendered_files: 0,
                truncated: false,
            }));
        }
        Err(source) => return Err(Error::ChangeList { source }),
    };
    debug!(%pair, files = changes.len(), "change list enumerated");
    generate_report(&changes, fetcher, pair, options, cancel)
}

fn paginate(changes: &[ChangeEntry], skip: usize, top: usize) -> &[ChangeEntry] {
    let start = skip.min(changes.len());
    let end = start.saturating_add(top).min(changes.len());
    &changes[start..end]
}

/// Process `page` on at most `options.max_parallel_fetches` workers.
///
/// Indices are claimed in increasing order and a worker checks `cancel`
/// before each claim. A file abandoned mid-fetch leaves its slot empty, and
/// only the filled slots before the first empty one are rendered.
fn process_page(
    page: &[ChangeEntry],
    fetcher: &dyn ContentFetcher,
    pair: &RevisionPair,
    options: &ReportOptions,
    cancel: &CancellationToken,
) -> Vec<Option<Result<ChangedFile>>> {
    let mut slots: Vec<Option<Result<ChangedFile>>> = (0..page.len()).map(|_| None).collect();
    if page.is_empty() {
        return slots;
    }

    let workers = options.max_parallel_fetches.clamp(1, page.len());
    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let next = &next;
            scope.spawn(move || loop {
                if cancel.is_cancelled() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(entry) = page.get(index) else { break };
                let Some(result) = process_file(entry, fetcher, pair, options, cancel) else {
                    break;
                };
                if sender.send((index, result)).is_err() {
                    break;
                }
            });
        }
    });
    drop(sender);

    for (index, result) in receiver {
        slots[index] = Some(result);
    }
    slots
}

/// Fetch and compare one file.
///
/// Returns `None` when `cancel` fired between the two fetches; the file is
/// then left out of the rendered prefix.
fn process_file(
    entry: &ChangeEntry,
    fetcher: &dyn ContentFetcher,
    pair: &RevisionPair,
    options: &ReportOptions,
    cancel: &CancellationToken,
) -> Option<Result<ChangedFile>> {
    if !options.include_content {
        return Some(Ok(ChangedFile::header_only(entry.clone())));
    }

    let before = match load_side(
        fetcher,
        entry.change_type.has_before(),
        entry.before_path(),
        &pair.base,
    ) {
        Ok(lines) => lines,
        Err(message) => return Some(Ok(ChangedFile::fetch_failed(entry.clone(), message))),
    };
    if cancel.is_cancelled() {
        debug!(path = %entry.path, "cancelled between fetches");
        return None;
    }
    let after = match load_side(
        fetcher,
        entry.change_type.has_after(),
        &entry.path,
        &pair.head,
    ) {
        Ok(lines) => lines,
        Err(message) => return Some(Ok(ChangedFile::fetch_failed(entry.clone(), message))),
    };

    debug!(
        path = %entry.path,
        before_lines = before.len(),
        after_lines = after.len(),
        "comparing file"
    );
    Some(ChangedFile::compare(
        entry.clone(),
        &before,
        &after,
        options.context_size,
        options.unchanged_fallback_line_cap,
    ))
}

/// Fetch one side of a file; absent content becomes an empty sequence.
fn load_side(
    fetcher: &dyn ContentFetcher,
    wanted: bool,
    path: &str,
    revision: &str,
) -> std::result::Result<LineSequence, String> {
    if !wanted {
        return Ok(LineSequence::empty());
    }
    match fetch_text(fetcher, path, revision) {
        Ok(text) => Ok(text.map_or_else(LineSequence::empty, |text| split(&text))),
        Err(err) => {
            warn!(path, revision, error = %err, "failed to fetch file content");
            Err(format!("failed to fetch {path} at {revision}: {err}"))
        }
    }
}

fn fetch_text(
    fetcher: &dyn ContentFetcher,
    path: &str,
    revision: &str,
) -> SourceResult<Option<String>> {
    match fetcher.fetch(path, revision) {
        Err(err) if err.is_not_found() => Ok(None),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChangeType;

    fn entries(count: usize) -> Vec<ChangeEntry> {
        (1..=count)
            .map(|n| ChangeEntry::new(format!("file{n:03}.txt"), ChangeType::Edit))
            .collect()
    }

    #[test]
    fn paginate_clamps_to_list_bounds() {
        let changes = entries(10);
        assert_eq!(paginate(&changes, 0, 3).len(), 3);
        assert_eq!(paginate(&changes, 8, 5).len(), 2);
        assert!(paginate(&changes, 20, 5).is_empty());
        assert_eq!(paginate(&changes, 2, usize::MAX)[0].path, "file003.txt");
    }

    struct Unreachable;

    impl ContentFetcher for Unreachable {
        fn fetch(&self, path: &str, _revision: &str) -> SourceResult<Option<String>> {
            panic!("unexpected fetch of {path}");
        }
    }

    #[test]
    fn header_only_reports_never_fetch() {
        let changes = entries(3);
        let outcome = generate_report(
            &changes,
            &Unreachable,
            &RevisionPair::new("a", "b"),
            &ReportOptions::default(),
            &CancellationToken::new(),
        )
        .expect("report");
        assert!(!outcome.is_partial());
        assert_eq!(outcome.report().rendered_files, 3);
        assert!(outcome.text().contains("=== file002.txt [edit] ===\n"));
    }

    #[test]
    fn empty_change_list_reports_no_differences() {
        let outcome = generate_report(
            &[],
            &Unreachable,
            &RevisionPair::new("a", "b"),
            &ReportOptions::default(),
            &CancellationToken::new(),
        )
        .expect("report");
        assert_eq!(outcome.text(), "No differences found between a and b.\n");
    }

    #[test]
    fn cancelled_before_start_renders_only_the_note() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = generate_report(
            &entries(4),
            &Unreachable,
            &RevisionPair::new("a", "b"),
            &ReportOptions::default(),
            &cancel,
        )
        .expect("report");
        let report = outcome.report();
        assert!(report.truncated);
        assert_eq!(report.rendered_files, 0);
        assert!(report.text.ends_with(
            "[report truncated: processed 0 of 4 file(s) before cancellation]\n"
        ));
    }
}
