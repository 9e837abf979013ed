use std::path::PathBuf;

use message_parts::PartDecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("I/O error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot must be a JSON {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("message {index} in snapshot is invalid: {source}")]
    Message {
        index: usize,
        #[source]
        source: PartDecodeError,
    },

    #[error("snapshot maps are invalid: {source}")]
    Maps {
        #[source]
        source: serde_json::Error,
    },
}
