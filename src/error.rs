use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the comment pipeline. Every variant is recoverable:
/// the store is left exactly as it was before the failing call.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("input is empty")]
    EmptyInput,
    #[error("sentiment classifier unavailable: {reason}")]
    ClassificationUnavailable { reason: String },
    #[error("no comments to export")]
    NothingToExport,
    #[error("failed to write export to {path:?}: {source}")]
    ExportWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CoreError::ClassificationUnavailable {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key} in {path}: {reason}")]
    Invalid {
        path: String,
        key: &'static str,
        reason: String,
    },
}
