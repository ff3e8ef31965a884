//! Connection options applied when a context is opened.

use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pragmas and timeouts applied to every connection opened by `open_db*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Enables `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl ContextOptions {
    pub(crate) fn pragma_sql(&self) -> &'static str {
        if self.foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        }
    }
}
