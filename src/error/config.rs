//! Configuration errors.

use thiserror::Error;

/// Invalid configuration values. These are rejected eagerly and never
/// clamped into range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The pause between downloads must be a whole number of seconds >= 0.
    #[error("pause_between_downloads must be a non-negative integer, got {0}")]
    InvalidPause(String),

    /// An environment variable could not be parsed.
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// No home directory to derive default paths from.
    #[error("Could not determine the home directory")]
    NoHomeDirectory,
}
