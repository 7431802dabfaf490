use std::fmt;

use serde::{Deserialize, Serialize};

/// The pair of revisions compared to produce a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionPair {
    /// Revision holding the "before" snapshot.
    pub base: String,
    /// Revision holding the "after" snapshot.
    pub head: String,
}

impl RevisionPair {
    /// Convenience constructor.
    pub fn new(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
        }
    }
}

impl fmt::Display for RevisionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.base, self.head)
    }
}

/// How a file changed between the two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// File only exists in the head revision.
    Add,
    /// File exists in both revisions.
    Edit,
    /// File only exists in the base revision.
    Delete,
    /// File moved from another path, possibly with edits.
    Rename,
}

impl ChangeType {
    /// Whether the base revision holds content for this change.
    pub const fn has_before(self) -> bool {
        !matches!(self, Self::Add)
    }

    /// Whether the head revision holds content for this change.
    pub const fn has_after(self) -> bool {
        !matches!(self, Self::Delete)
    }

    /// Lowercase label used in rendered reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One file touched by a revision comparison, as enumerated by a change-list source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Path of the file in the head revision (or base revision for deletes).
    pub path: String,
    /// Kind of change applied to the file.
    pub change_type: ChangeType,
    /// Previous path when the file was renamed.
    #[serde(default)]
    pub renamed_from: Option<String>,
}

impl ChangeEntry {
    /// Create an entry without rename information.
    pub fn new(path: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            path: path.into(),
            change_type,
            renamed_from: None,
        }
    }

    /// Create a rename entry.
    pub fn renamed(path: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change_type: ChangeType::Rename,
            renamed_from: Some(from.into()),
        }
    }

    /// Path to read in the base revision.
    pub fn before_path(&self) -> &str {
        self.renamed_from.as_deref().unwrap_or(&self.path)
    }
}
