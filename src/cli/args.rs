//! Command-line argument parsing.
//!
//! The command line is deliberately small: `theme-finder [add]
//! [--version|-V]`.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Prompt for another server before downloading
    Add,
    /// Connect and download themes (default)
    Run,
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use themefinder::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["theme-finder".to_string(), "add".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Add);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut command = CliCommand::Run;
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "add" => command = CliCommand::Add,
            _ => {}
        }
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["theme-finder", "--version"]), CliCommand::Version);
        assert_eq!(parse(&["theme-finder", "-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(parse(&["theme-finder", "add"]), CliCommand::Add);
    }

    #[test]
    fn test_version_wins_over_add() {
        assert_eq!(parse(&["theme-finder", "add", "-V"]), CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&["theme-finder"]), CliCommand::Run);
    }

    #[test]
    fn test_parse_unknown_arg() {
        assert_eq!(parse(&["theme-finder", "--unknown"]), CliCommand::Run);
        // The program name itself is never a command
        assert_eq!(parse(&["add"]), CliCommand::Run);
    }
}
