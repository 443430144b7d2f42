//! Credential store errors.

use std::path::PathBuf;

use thiserror::Error;

use super::category::ErrorCategory;

/// Errors raised while loading or saving the persisted server list.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid server list.
    #[error("Malformed credentials file {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the in-memory list failed.
    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::Io { .. } => ErrorCategory::System,
            StoreError::Malformed { .. } => ErrorCategory::Configuration,
            StoreError::Serialize(_) => ErrorCategory::System,
        }
    }
}
