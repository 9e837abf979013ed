//! `tracing` subscriber setup for binaries and tests.
//!
//! The library only emits events; installing a subscriber is left to the
//! caller. `SEGMENT_VIEW_LOG` holds an `EnvFilter` directive (default `warn`)
//! and `SEGMENT_VIEW_LOG_FILE` redirects output from stderr to a file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Installs the global subscriber described by `config`.
///
/// Returns `Ok(false)` when another subscriber was already installed.
pub fn init(config: &EnvConfig) -> Result<bool, LoggingError> {
    let filter = build_filter(config.log_filter.as_deref())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(Path::new(path))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(io::stderr).try_init().is_ok(),
    };
    Ok(installed)
}

pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let filter = directive.unwrap_or(DEFAULT_LOG_FILTER);
    EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
        filter: filter.to_string(),
        source,
    })
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{build_filter, open_log_file, LoggingError};

    #[test]
    fn default_filter_is_valid() {
        assert!(build_filter(None).is_ok());
        assert!(build_filter(Some("segment_view=trace,message_parts=debug")).is_ok());
    }

    #[test]
    fn malformed_filter_is_reported() {
        let error = build_filter(Some("segment_view=notalevel")).expect_err("bad level");
        assert_matches!(error, LoggingError::Filter { filter, .. } if filter == "segment_view=notalevel");
    }

    #[test]
    fn log_file_is_created_in_append_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("view.log");
        open_log_file(&path).expect("first open");
        open_log_file(&path).expect("second open appends");
        assert!(path.exists());
    }

    #[test]
    fn missing_directory_is_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("view.log");
        let error = open_log_file(&path).expect_err("parent does not exist");
        assert_matches!(error, LoggingError::OpenLogFile { path: reported, .. } if reported == path);
    }
}
