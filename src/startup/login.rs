//! Interactive server login for the command line.

use std::io::{self, BufRead, Write};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::{info, warn};

use crate::manager::ClientManager;

/// Source of interactive answers. Abstracted so the flow can be driven by
/// scripted input in tests.
pub trait LoginPrompter {
    fn server_url(&mut self) -> io::Result<String>;
    fn username(&mut self) -> io::Result<String>;
    /// Read without echo.
    fn password(&mut self) -> io::Result<String>;
    fn confirm_add_another(&mut self) -> io::Result<bool>;
}

/// Prompts on stdout and reads stdin; the password is read without echo.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn ask(&self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl LoginPrompter for StdinPrompter {
    fn server_url(&mut self) -> io::Result<String> {
        self.ask("Server URL: ")
    }

    fn username(&mut self) -> io::Result<String> {
        self.ask("Username: ")
    }

    fn password(&mut self) -> io::Result<String> {
        rpassword::prompt_password("Password: ")
    }

    fn confirm_add_another(&mut self) -> io::Result<bool> {
        let answer = self.ask("Add another server? [y/N] ")?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer, "y" | "Y" | "yes" | "Yes")
}

/// Connect stored servers, then prompt for new ones.
///
/// Prompts while nothing is connected, or once up front when `add_another`
/// is set. A failed login is reported and prompted again. Returns whether a
/// server is logged in when the flow ends.
pub async fn cli_connect<P: LoginPrompter>(
    manager: &ClientManager,
    mut add_another: bool,
    prompter: &mut P,
) -> Result<bool> {
    let mut logged_in = manager
        .try_connect()
        .await
        .wrap_err("Failed to load saved servers")?;

    while !logged_in || add_another {
        let server = prompter.server_url().wrap_err("Failed to read server URL")?;
        let username = prompter.username().wrap_err("Failed to read username")?;
        let password = prompter.password().wrap_err("Failed to read password")?;

        match manager.login(&server, &username, &password, false).await {
            Ok(_) => {
                logged_in = true;
                info!("Successfully added server.");
                add_another = prompter
                    .confirm_add_another()
                    .wrap_err("Failed to read answer")?;
            }
            Err(e) => {
                warn!("Adding server failed: {}", e);
            }
        }
    }

    Ok(logged_in)
}
