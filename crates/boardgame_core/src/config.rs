//! Store configuration.
//!
//! # Responsibility
//! - Hold the collaborator-supplied database location and connection tuning.
//!
//! # Invariants
//! - `busy_timeout` applies to every per-call connection opened by the engine.

use std::path::PathBuf;
use std::time::Duration;

/// Database file used when the caller does not supply one.
pub const DEFAULT_DB_FILE_NAME: &str = "boardgames.db";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file backing the catalog.
    pub db_path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DEFAULT_DB_FILE_NAME};
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn default_points_at_fixed_file_name() {
        let config = StoreConfig::default();
        assert_eq!(config.db_path, Path::new(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn busy_timeout_can_be_overridden() {
        let config = StoreConfig::new("/tmp/x.db").with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }
}
