//! Startup: configuration and the interactive connect flow.
//!
//! # Components
//!
//! - [`config`] - Manager and download configuration
//! - [`login`] - Command-line server login

pub mod config;
pub mod login;

pub use config::{DownloadConfig, ManagerConfig, PauseBetweenDownloads};
pub use login::{cli_connect, LoginPrompter, StdinPrompter};
