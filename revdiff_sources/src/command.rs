use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use revdiff_source_api::{ContentFetcher, SourceError, SourceResult};
use wait_timeout::ChildExt;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PATH_PLACEHOLDER: &str = "{path}";
const REVISION_PLACEHOLDER: &str = "{revision}";
/// Exit status `git show` uses for any fatal error, missing paths included.
const GIT_FATAL_EXIT: i32 = 128;
/// `git show` stderr fragments that mean the path or revision does not exist.
const GIT_MISSING_MARKERS: [&str; 3] = [
    "does not exist in",
    "exists on disk, but not in",
    "invalid object name",
];

/// Content fetcher that shells out to an external program.
///
/// Every argument template may contain `{path}` and `{revision}`
/// placeholders. Standard output becomes the file content; configured exit
/// codes map to "file does not exist at this revision". When stderr markers
/// are configured, such an exit only counts as missing if stderr contains one
/// of them.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: OsString,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
    not_found_exit_codes: BTreeSet<i32>,
    not_found_stderr: Vec<String>,
    passthrough: Vec<(OsString, OsString)>,
    path: Option<OsString>,
    home: Option<OsString>,
}

impl CommandFetcher {
    /// Fetcher running `program` with the given argument templates.
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            not_found_exit_codes: BTreeSet::new(),
            not_found_stderr: Vec::new(),
            passthrough: Vec::new(),
            path: env::var_os("PATH"),
            home: env::var_os("HOME"),
        }
    }

    /// Fetcher running `git show {revision}:{path}` inside `repo_dir`.
    ///
    /// Exit 128 is only read as a missing file when git says so on stderr; a
    /// directory that is not a repository or a broken object store fails.
    pub fn git(repo_dir: impl Into<PathBuf>) -> Self {
        GIT_MISSING_MARKERS.iter().fold(
            Self::new("git", ["show", "{revision}:{path}"])
                .working_dir(repo_dir)
                .not_found_exit_code(GIT_FATAL_EXIT),
            |fetcher, marker| fetcher.not_found_stderr(*marker),
        )
    }

    /// Run the program from `dir`.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the program and fail with [`SourceError::Timeout`] after `timeout`.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Treat exit status `code` as "file does not exist at this revision".
    #[must_use]
    pub fn not_found_exit_code(mut self, code: i32) -> Self {
        self.not_found_exit_codes.insert(code);
        self
    }

    /// Require stderr to contain `marker` (or another configured marker)
    /// before a not-found exit status is read as a missing file.
    #[must_use]
    pub fn not_found_stderr(mut self, marker: impl Into<String>) -> Self {
        self.not_found_stderr.push(marker.into());
        self
    }

    fn reports_missing(&self, code: Option<i32>, stderr: &str) -> bool {
        code.is_some_and(|code| self.not_found_exit_codes.contains(&code))
            && (self.not_found_stderr.is_empty()
                || self
                    .not_found_stderr
                    .iter()
                    .any(|marker| stderr.contains(marker.as_str())))
    }

    /// Forward an environment variable from the current process, if set.
    #[must_use]
    pub fn passthrough_env(mut self, key: impl Into<OsString>) -> Self {
        let key = key.into();
        if let Some(value) = env::var_os(&key) {
            self.passthrough.push((key, value));
        }
        self
    }

    fn build_command(&self, path: &str, revision: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.args.iter().map(|template| {
            template
                .replace(PATH_PLACEHOLDER, path)
                .replace(REVISION_PLACEHOLDER, revision)
        }));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        command.env_clear();
        if let Some(path) = &self.path {
            command.env("PATH", path);
        }
        if let Some(home) = &self.home {
            command.env("HOME", home);
        }
        for (key, value) in &self.passthrough {
            command.env(key, value);
        }
        command
    }
}

impl ContentFetcher for CommandFetcher {
    fn fetch(&self, path: &str, revision: &str) -> SourceResult<Option<String>> {
        let started = Instant::now();
        let mut child = self
            .build_command(path, revision)
            .spawn()
            .map_err(|err| {
                SourceError::message(format!(
                    "failed to spawn {}: {err}",
                    self.program.to_string_lossy()
                ))
            })?;

        let stdout_handle = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stdout.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        let stderr_handle = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || -> io::Result<Vec<u8>> {
                let mut buffer = Vec::new();
                stderr.read_to_end(&mut buffer)?;
                Ok(buffer)
            })
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(path, revision, timeout = ?self.timeout, "fetch command timed out");
                return Err(SourceError::Timeout {
                    elapsed: started.elapsed(),
                });
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::message(format!(
                    "failed waiting on fetch command: {err}"
                )));
            }
        };

        let stdout = join_reader(stdout_handle, "stdout")?;
        let stderr = join_reader(stderr_handle, "stderr")?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            if self.reports_missing(status.code(), &stderr) {
                tracing::debug!(path, revision, "fetch command reported missing file");
                return Ok(None);
            }
            let code = status
                .code()
                .map_or_else(|| "terminated".to_string(), |c| c.to_string());
            return Err(SourceError::message(format!(
                "fetch command failed with status {}: {}",
                code,
                stderr.trim()
            )));
        }

        String::from_utf8(stdout)
            .map(Some)
            .map_err(|_| SourceError::Unsupported {
                reason: format!("{path} at {revision} is not valid UTF-8"),
            })
    }
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> SourceResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| SourceError::message(format!("failed to join {stream} reader")))?
            .map_err(|err| SourceError::message(format!("failed to read {stream}: {err}"))),
        None => Ok(Vec::new()),
    }
}
