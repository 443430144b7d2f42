//! Errors returned by an interactive or programmatic login.

use thiserror::Error;

use super::category::ErrorCategory;
use super::client::ClientError;
use super::store::StoreError;

/// Why adding a server failed. Login failures are never retried
/// automatically; the caller decides whether to prompt again.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The address does not look like `[http(s)://]host[:port][/path]`.
    #[error("Invalid server address '{0}'")]
    InvalidAddress(String),

    /// The manager has been stopped.
    #[error("Client manager is stopping")]
    Stopping,

    /// The backend rejected the login or could not be reached.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The new record could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoginError::InvalidAddress(_) => ErrorCategory::User,
            LoginError::Stopping => ErrorCategory::System,
            LoginError::Client(e) => e.category(),
            LoginError::Store(e) => e.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_category_follows_source() {
        let err: LoginError = ClientError::AuthRejected {
            username: "alice".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert_eq!(err.to_string(), "Login rejected for user 'alice'");

        let err = LoginError::InvalidAddress("ftp://x".to_string());
        assert_eq!(err.category(), ErrorCategory::User);
    }
}
