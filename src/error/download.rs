//! Theme download errors. These are per item: the batch logs and skips.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use super::client::ClientError;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The item carries neither a media source path nor a folder path.
    #[error("Item {item_id} has no {field}")]
    MissingField { item_id: String, field: &'static str },

    /// Fetching the item from the backend failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The theme search tool could not be run or failed.
    #[error("Theme search for '{query}' failed: {source}")]
    Search {
        query: String,
        #[source]
        source: ToolError,
    },

    /// The audio extraction tool could not be run or failed.
    #[error("Audio extraction of {video} failed: {source}")]
    Extract {
        video: String,
        #[source]
        source: ToolError,
    },

    /// The audio download ran but produced no usable file.
    #[error("Audio download of {video} failed: {message}")]
    Download { video: String, message: String },

    /// Moving the downloaded file into the media folder failed.
    #[error("Failed to move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An external program did not run to success.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("could not run {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited with {status}: {stderr}")]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}
