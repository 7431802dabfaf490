use std::process::ExitCode;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use revdiff_core::logging::{self, Profile};
use revdiff_core::repository::Repository;
use revdiff_core::{
    generate_report_for, CancellationToken, ReportOptions, ReportOutcome, RevisionPair,
};

const EXIT_PARTIAL: u8 = 2;
const EXIT_FATAL: u8 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "revdiff",
    about = "Render a line-numbered report of the files changed between two revisions"
)]
struct Args {
    /// Repository to inspect (defaults to the current directory)
    #[arg(long, default_value = ".")]
    repo: Utf8PathBuf,

    /// TOML file with report options; flags override its values
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Number of changed files to skip
    #[arg(long)]
    skip: Option<usize>,

    /// Maximum number of changed files to render
    #[arg(long)]
    top: Option<usize>,

    /// Fetch and compare file content instead of listing headers only
    #[arg(long)]
    content: bool,

    /// Lines of context around each changed region
    #[arg(long)]
    context: Option<usize>,

    /// Head and tail lines shown for files without content changes
    #[arg(long)]
    fallback_cap: Option<usize>,

    /// Maximum number of files processed concurrently
    #[arg(long)]
    jobs: Option<usize>,

    /// Emit JSON logs on stderr
    #[arg(long)]
    json_logs: bool,

    /// Base revision
    base: String,

    /// Head revision
    head: String,
}

impl Args {
    fn options(&self) -> Result<ReportOptions> {
        let mut options = match &self.config {
            Some(path) => ReportOptions::load(path.as_std_path())
                .with_context(|| format!("failed to load options from {path}"))?,
            None => ReportOptions::default(),
        };
        if let Some(skip) = self.skip {
            options.skip = skip;
        }
        if let Some(top) = self.top {
            options.top = top;
        }
        if self.content {
            options.include_content = true;
        }
        if let Some(context) = self.context {
            options.context_size = context;
        }
        if let Some(cap) = self.fallback_cap {
            options.unchanged_fallback_line_cap = cap;
        }
        if let Some(jobs) = self.jobs {
            options.max_parallel_fetches = jobs;
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(if args.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    match run(&args) {
        Ok(outcome) => {
            print!("{}", outcome.text());
            if outcome.is_partial() {
                ExitCode::from(EXIT_PARTIAL)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("revdiff: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(args: &Args) -> Result<ReportOutcome> {
    let options = args.options()?;
    let repo = Repository::open(args.repo.as_std_path())
        .with_context(|| format!("failed to open repository at {}", args.repo))?;
    let pair = RevisionPair::new(args.base.as_str(), args.head.as_str());

    generate_report_for(&repo, &repo, &pair, &options, &CancellationToken::new())
        .with_context(|| format!("failed to generate report for {pair}"))
}
