use std::time::Duration;

/// Errors surfaced by change-list and content sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested revision or revision pair does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing object.
        what: String,
    },
    /// The source did not answer within its deadline.
    #[error("timed out after {}s", elapsed.as_secs())]
    Timeout {
        /// Time waited before giving up.
        elapsed: Duration,
    },
    /// Content exists but cannot be represented as text.
    #[error("unsupported content: {reason}")]
    Unsupported {
        /// Why the content was rejected.
        reason: String,
    },
    /// Generic failure surfaced by the source.
    #[error("{message}")]
    Failure {
        /// Human-readable error message.
        message: String,
    },
}

impl SourceError {
    /// Helper to construct a failure from any displayable message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Helper to construct a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Whether this error means the object is absent rather than unreachable.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience result alias for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
