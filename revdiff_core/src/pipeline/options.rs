use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::DEFAULT_LINE_NUMBER_WIDTH;
use crate::{Error, Result};

/// Knobs controlling a single report generation.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Number of changed files to skip before the page starts.
    pub skip: usize,
    /// Maximum number of changed files in the page.
    pub top: usize,
    /// Fetch and compare file content instead of listing headers only.
    pub include_content: bool,
    /// Lines of context shown on each side of a changed region.
    pub context_size: usize,
    /// Head and tail line count shown for files without differences.
    pub unchanged_fallback_line_cap: usize,
    /// Upper bound on files processed concurrently.
    pub max_parallel_fetches: usize,
    /// Width of the right-aligned line-number column.
    pub line_number_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            top: 100,
            include_content: false,
            context_size: 5,
            unchanged_fallback_line_cap: 50,
            max_parallel_fetches: 4,
            line_number_width: DEFAULT_LINE_NUMBER_WIDTH,
        }
    }
}

impl ReportOptions {
    /// Parse options from TOML text; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the text is not valid TOML or holds
    /// values of the wrong type.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: origin.to_owned(),
            source,
        })
    }

    /// Read options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and [`Error::Config`]
    /// when it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.to_string_lossy().into_owned();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = ReportOptions::default();
        assert_eq!(options.top, 100);
        assert_eq!(options.skip, 0);
        assert!(!options.include_content);
        assert_eq!(options.context_size, 5);
        assert_eq!(options.unchanged_fallback_line_cap, 50);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let options = ReportOptions::from_toml_str(
            "include_content = true\ncontext_size = 2\n",
            "inline",
        )
        .expect("parse options");
        assert!(options.include_content);
        assert_eq!(options.context_size, 2);
        assert_eq!(options.top, 100);
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = ReportOptions::from_toml_str("top = \"many\"", "revdiff.toml")
            .expect_err("invalid options");
        assert!(matches!(err, Error::Config { ref path, .. } if path == "revdiff.toml"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("revdiff.toml");
        std::fs::write(&path, "skip = 10\ntop = 5\n").expect("write options");
        let options = ReportOptions::load(&path).expect("load options");
        assert_eq!((options.skip, options.top), (10, 5));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ReportOptions::load("/nonexistent/revdiff.toml").expect_err("missing file");
        assert!(matches!(err, Error::Io { .. }));
    }
}
