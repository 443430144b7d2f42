//! Error types for the theme finder.
//!
//! Each concern gets its own enum; [`ErrorCategory`] gives them a shared
//! vocabulary for retry decisions and logging.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout, socket | Yes |
//! | Auth | Rejected or missing credentials | No |
//! | Server | Backend errors (5xx) | Yes |
//! | User | Bad input | No |
//! | System | OS/filesystem errors | No |
//! | Configuration | Invalid settings | No |

mod category;
mod client;
mod config;
mod download;
mod login;
mod store;

pub use category::ErrorCategory;
pub use client::{classify_reqwest_error, ClientError};
pub use config::ConfigError;
pub use download::{DownloadError, ToolError};
pub use login::LoginError;
pub use store::StoreError;
