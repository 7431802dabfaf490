//! Tracing subscriber setup.
//!
//! Reports go to stdout, so every profile writes logs to stderr.

use std::sync::Once;

use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level.
    Development,
    /// JSON structured output at info level.
    Production,
    /// Bare registry; events are discarded unless a test installs its own
    /// subscriber.
    Test,
}

impl Profile {
    /// Filter applied when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        match self {
            Self::Development => "revdiff=debug",
            Self::Production => "revdiff=info",
            Self::Test => "off",
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn env_filter(profile: Profile) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.default_directive()))
}

/// Install the global subscriber for `profile`.
///
/// Only the first call has an effect. A subscriber installed by someone else
/// beforehand is left in place.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(env_filter(profile))
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter(profile))
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        if installed.is_err() {
            tracing::debug!(?profile, "global subscriber already installed");
        }
    });
}
