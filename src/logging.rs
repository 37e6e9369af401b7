//! File logging. The terminal belongs to the TUI, so nothing is written to
//! stdout or stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::error::{DaziError, Result};

/// Environment variable holding the filter directive, e.g. `DAZI_LOG=debug`.
pub const LOG_ENV: &str = "DAZI_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, appending to `path`.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| DaziError::Logging {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_file_and_rejects_second_init() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state/dazi.log");

        init(&path).unwrap();
        assert!(path.exists());

        // only one global subscriber per process
        let again = init(&dir.path().join("other.log"));
        assert!(matches!(again, Err(DaziError::Logging { .. })));
    }
}
