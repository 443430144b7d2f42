//! CLI module.
//!
//! Handles the flags that short-circuit the normal run, before any runtime
//! or logging is set up:
//!
//! ```ignore
//! use themefinder::cli::{parse_args, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if command == CliCommand::Version {
//!     themefinder::cli::handle_version_command();
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{handle_version_command, VERSION};
