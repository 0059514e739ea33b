//! Tracing subscriber setup shared by the binary and the dashboard.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::path_processing::config_file_path;

/// Environment variable used to override the dashboard log file path.
pub const LOG_PATH_ENV: &str = "CHORDCHAIN_LOG_PATH";

const LOG_FILE_NAME: &str = "chordchain.log";
const DEFAULT_FILTER: &str = "info";

/// Where formatted log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, used by the headless subcommands.
    Stderr,
    /// Append to a file, used while the terminal UI owns stdout.
    File(PathBuf),
}

impl LogTarget {
    /// File target at the default location (or `CHORDCHAIN_LOG_PATH`).
    pub fn default_file() -> Self {
        LogTarget::File(default_log_path())
    }
}

pub fn default_log_path() -> PathBuf {
    config_file_path(LOG_PATH_ENV, LOG_FILE_NAME)
}

/// Resolve the filter directive: an explicit level wins, then `RUST_LOG`,
/// then `info`.
pub fn resolve_filter(explicit: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber. Repeated calls are ignored.
pub fn init_tracing(level: Option<&str>, target: LogTarget) -> io::Result<()> {
    let filter = EnvFilter::try_new(resolve_filter(level)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
        }
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_level_wins_over_environment() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            assert_eq!(resolve_filter(Some("debug")), "debug");
            assert_eq!(resolve_filter(Some("  ")), "warn");
            assert_eq!(resolve_filter(None), "warn");
        });
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(resolve_filter(None), "info");
        });
    }

    #[test]
    fn log_path_honors_env_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("dash.log");
        temp_env::with_var(LOG_PATH_ENV, Some(path.to_str().unwrap()), || {
            assert_eq!(LogTarget::default_file(), LogTarget::File(path.clone()));
        });
    }

    #[test]
    fn log_file_parent_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("chordchain.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
