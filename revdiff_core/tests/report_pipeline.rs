use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use revdiff_core::{
    generate_report, generate_report_for, CancellationToken, ChangeEntry, ChangeListProvider,
    ChangeType, ContentFetcher, Error, MemorySource, ReportOptions, RevisionPair, SourceError,
    SourceResult,
};

fn pair() -> RevisionPair {
    RevisionPair::new("v1", "v2")
}

fn with_content() -> ReportOptions {
    ReportOptions {
        include_content: true,
        ..ReportOptions::default()
    }
}

fn header_positions(text: &str, paths: &[&str]) -> Vec<usize> {
    paths
        .iter()
        .map(|path| {
            text.find(&format!("=== {path} ["))
                .unwrap_or_else(|| panic!("missing header for {path}"))
        })
        .collect()
}

#[test]
fn pure_addition_renders_added_block_with_context() {
    let changes = vec![ChangeEntry::new("notes.txt", ChangeType::Edit)];
    let source = MemorySource::new()
        .with_file("v1", "notes.txt", "a\nb\n")
        .with_file("v2", "notes.txt", "a\nb\nc\n");

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &with_content(),
        &CancellationToken::new(),
    )
    .expect("report");

    let expected = "\
Comparing v1 -> v2: 1 changed file(s), showing 1-1

=== notes.txt [edit] (+1 -0) ===
@@ added: before 3-2 -> after 3-3 @@
  before:
        1: a
        2: b
  after:
        1: a
        2: b
  +     3: c
";
    assert!(!outcome.is_partial());
    assert_eq!(outcome.text(), expected);
}

#[test]
fn pagination_fetches_only_the_requested_page() {
    let changes: Vec<ChangeEntry> = (1..=250)
        .map(|n| ChangeEntry::new(format!("file{n:03}.txt"), ChangeType::Edit))
        .collect();
    let source = (1..=250).fold(MemorySource::new(), |source, n| {
        let path = format!("file{n:03}.txt");
        source
            .with_file("v1", path.clone(), "old\n")
            .with_file("v2", path, "new\n")
    });
    let options = ReportOptions {
        skip: 100,
        top: 50,
        ..with_content()
    };

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &options,
        &CancellationToken::new(),
    )
    .expect("report");
    let report = outcome.report();

    assert_eq!(report.total_files, 250);
    assert_eq!(report.rendered_files, 50);
    assert!(report
        .text
        .starts_with("Comparing v1 -> v2: 250 changed file(s), showing 101-150\n"));
    assert!(!report.text.contains("file100.txt"));
    assert!(!report.text.contains("file151.txt"));

    let page: Vec<String> = (101..=150).map(|n| format!("file{n:03}.txt")).collect();
    let page_refs: Vec<&str> = page.iter().map(String::as_str).collect();
    let positions = header_positions(&report.text, &page_refs);
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let fetch_log = source.fetch_log();
    assert_eq!(fetch_log.len(), 100);
    assert!(fetch_log
        .iter()
        .all(|(path, _)| page.iter().any(|wanted| wanted == path)));
}

#[test]
fn output_order_ignores_fetch_completion_order() {
    let paths = ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"];
    let changes: Vec<ChangeEntry> = paths
        .iter()
        .map(|path| ChangeEntry::new(*path, ChangeType::Edit))
        .collect();
    let source = paths
        .iter()
        .fold(MemorySource::new(), |source, path| {
            source
                .with_file("v1", *path, "one\n")
                .with_file("v2", *path, "two\n")
        })
        .with_delay("a.txt", Duration::from_millis(150))
        .with_delay("b.txt", Duration::from_millis(75));
    let options = ReportOptions {
        max_parallel_fetches: 4,
        ..with_content()
    };

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &options,
        &CancellationToken::new(),
    )
    .expect("report");

    let positions = header_positions(outcome.text(), &paths);
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn header_only_reports_issue_no_fetches() {
    let changes = vec![
        ChangeEntry::new("added.txt", ChangeType::Add),
        ChangeEntry::new("edited.txt", ChangeType::Edit),
    ];
    let source = MemorySource::new();

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &ReportOptions::default(),
        &CancellationToken::new(),
    )
    .expect("report");

    assert!(source.fetch_log().is_empty());
    assert!(outcome
        .text()
        .ends_with("=== added.txt [add] ===\n\n=== edited.txt [edit] ===\n"));
}

#[test]
fn fetch_failure_degrades_single_file() {
    let changes = vec![
        ChangeEntry::new("good.txt", ChangeType::Edit),
        ChangeEntry::new("bad.txt", ChangeType::Edit),
        ChangeEntry::new("also_good.txt", ChangeType::Edit),
    ];
    let source = MemorySource::new()
        .with_file("v1", "good.txt", "x\n")
        .with_file("v2", "good.txt", "y\n")
        .with_file("v1", "also_good.txt", "x\n")
        .with_file("v2", "also_good.txt", "x\nz\n")
        .with_failure("bad.txt", "connection reset");

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &with_content(),
        &CancellationToken::new(),
    )
    .expect("report");

    assert!(outcome.is_partial());
    let failures = outcome.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "bad.txt");
    assert_eq!(
        failures[0].message,
        "failed to fetch bad.txt at v1: connection reset"
    );
    assert!(outcome.text().contains(
        "=== bad.txt [edit] ===\n  ! content unavailable: failed to fetch bad.txt at v1: connection reset\n"
    ));
    assert!(outcome.text().contains("=== good.txt [edit] (+1 -1) ==="));
    assert!(outcome.text().contains("=== also_good.txt [edit] (+1 -0) ==="));
    assert_eq!(outcome.report().rendered_files, 3);
}

#[test]
fn adds_and_deletes_skip_the_missing_side() {
    let changes = vec![
        ChangeEntry::new("new.txt", ChangeType::Add),
        ChangeEntry::new("old.txt", ChangeType::Delete),
    ];
    let source = MemorySource::new()
        .with_file("v2", "new.txt", "hello\n")
        .with_file("v1", "old.txt", "bye\n");
    let options = ReportOptions {
        max_parallel_fetches: 1,
        ..with_content()
    };

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &options,
        &CancellationToken::new(),
    )
    .expect("report");

    assert_eq!(
        source.fetch_log(),
        vec![
            ("new.txt".to_owned(), "v2".to_owned()),
            ("old.txt".to_owned(), "v1".to_owned()),
        ]
    );
    assert!(outcome.text().contains("@@ added: before 1-0 -> after 1-1 @@\n"));
    assert!(outcome.text().contains("  +     1: hello\n"));
    assert!(outcome.text().contains("@@ removed: before 1-1 -> after 1-0 @@\n"));
    assert!(outcome.text().contains("  -     1: bye\n"));
}

#[test]
fn rename_without_changes_uses_unchanged_fallback() {
    let changes = vec![ChangeEntry::renamed("src/new.rs", "src/old.rs")];
    let source = MemorySource::new()
        .with_file("v1", "src/old.rs", "fn main() {}\n")
        .with_file("v2", "src/new.rs", "fn main() {}\n");

    let outcome = generate_report(
        &changes,
        &source,
        &pair(),
        &with_content(),
        &CancellationToken::new(),
    )
    .expect("report");

    assert!(outcome.text().contains(
        "=== src/new.rs [rename] (renamed from src/old.rs) (+0 -0) ===\n  no content changes\n        1: fn main() {}\n"
    ));
    assert_eq!(
        source.fetch_log(),
        vec![
            ("src/old.rs".to_owned(), "v1".to_owned()),
            ("src/new.rs".to_owned(), "v2".to_owned()),
        ]
    );
}

#[test]
fn not_found_content_is_treated_as_empty() {
    struct NotFoundFetcher;

    impl ContentFetcher for NotFoundFetcher {
        fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
            if revision == "v1" {
                Err(SourceError::not_found(format!("{revision}:{path}")))
            } else {
                Ok(Some("fresh\n".to_owned()))
            }
        }
    }

    let changes = vec![ChangeEntry::new("f.txt", ChangeType::Edit)];
    let outcome = generate_report(
        &changes,
        &NotFoundFetcher,
        &pair(),
        &with_content(),
        &CancellationToken::new(),
    )
    .expect("report");

    assert!(!outcome.is_partial());
    assert!(outcome.text().contains("=== f.txt [edit] (+1 -0) ==="));
}

struct CancellingFetcher {
    inner: MemorySource,
    cancel: CancellationToken,
    cancel_after: usize,
    calls: AtomicUsize,
}

impl ContentFetcher for CancellingFetcher {
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.cancel_after {
            self.cancel.cancel();
        }
        self.inner.fetch(path, revision)
    }
}

#[test]
fn cancellation_renders_completed_prefix_and_note() {
    let paths = ["1.txt", "2.txt", "3.txt", "4.txt", "5.txt"];
    let changes: Vec<ChangeEntry> = paths
        .iter()
        .map(|path| ChangeEntry::new(*path, ChangeType::Add))
        .collect();
    let cancel = CancellationToken::new();
    let fetcher = CancellingFetcher {
        inner: paths.iter().fold(MemorySource::new(), |source, path| {
            source.with_file("v2", *path, "line\n")
        }),
        cancel: cancel.clone(),
        cancel_after: 3,
        calls: AtomicUsize::new(0),
    };
    let options = ReportOptions {
        max_parallel_fetches: 1,
        ..with_content()
    };

    let outcome =
        generate_report(&changes, &fetcher, &pair(), &options, &cancel).expect("report");
    let report = outcome.report();

    assert!(report.truncated);
    assert_eq!(report.rendered_files, 3);
    assert!(report.text.contains("=== 3.txt [add]"));
    assert!(!report.text.contains("=== 4.txt"));
    assert!(report
        .text
        .ends_with("\n[report truncated: processed 3 of 5 file(s) before cancellation]\n"));
    assert_eq!(fetcher.inner.fetch_log().len(), 3);
}

#[test]
fn cancellation_between_sides_skips_the_second_fetch() {
    let changes = vec![
        ChangeEntry::new("first.txt", ChangeType::Edit),
        ChangeEntry::new("second.txt", ChangeType::Edit),
    ];
    let cancel = CancellationToken::new();
    let fetcher = CancellingFetcher {
        inner: MemorySource::new()
            .with_file("v1", "first.txt", "old\n")
            .with_file("v2", "first.txt", "new\n"),
        cancel: cancel.clone(),
        cancel_after: 1,
        calls: AtomicUsize::new(0),
    };
    let options = ReportOptions {
        max_parallel_fetches: 1,
        ..with_content()
    };

    let outcome =
        generate_report(&changes, &fetcher, &pair(), &options, &cancel).expect("report");
    let report = outcome.report();

    assert_eq!(
        fetcher.inner.fetch_log(),
        vec![("first.txt".to_owned(), "v1".to_owned())]
    );
    assert!(report.truncated);
    assert_eq!(report.rendered_files, 0);
    assert!(!report.text.contains("=== first.txt"));
    assert!(report
        .text
        .ends_with("[report truncated: processed 0 of 2 file(s) before cancellation]\n"));
}

#[test]
fn unknown_revision_pair_reports_no_iterations() {
    let source = MemorySource::new();
    let outcome = generate_report_for(
        &source,
        &source,
        &RevisionPair::new("missing", "also-missing"),
        &ReportOptions::default(),
        &CancellationToken::new(),
    )
    .expect("report");

    assert!(!outcome.is_partial());
    assert!(outcome
        .text()
        .starts_with("No iterations found for missing -> also-missing:"));
}

#[test]
fn empty_change_list_reports_no_differences() {
    let source = MemorySource::new().with_changes(pair(), Vec::new());
    let outcome = generate_report_for(
        &source,
        &source,
        &pair(),
        &with_content(),
        &CancellationToken::new(),
    )
    .expect("report");
    assert_eq!(outcome.text(), "No differences found between v1 and v2.\n");
}

#[test]
fn provider_transport_failure_is_fatal() {
    struct Unreachable;

    impl ChangeListProvider for Unreachable {
        fn list_changes(&self, _pair: &RevisionPair) -> SourceResult<Vec<ChangeEntry>> {
            Err(SourceError::message("service unavailable"))
        }
    }

    let err = generate_report_for(
        &Unreachable,
        &MemorySource::new(),
        &pair(),
        &ReportOptions::default(),
        &CancellationToken::new(),
    )
    .expect_err("fatal");
    assert!(matches!(err, Error::ChangeList { .. }));
    assert_eq!(err.to_string(), "failed to list changes: service unavailable");
}
