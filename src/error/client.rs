//! Backend and transport errors.
//!
//! Everything that can go wrong while talking to a media server: HTTP
//! requests, the event socket, and rejected credentials.

use thiserror::Error;

use super::category::ErrorCategory;

/// Errors raised by a [`MediaClient`](crate::traits::MediaClient).
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connection to the server failed.
    #[error("Connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// HTTP status error (non-2xx response).
    #[error("Server returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The server did not hand out an access token.
    #[error("Login rejected for user '{username}'")]
    AuthRejected { username: String },

    /// An authenticated call was made before login/authenticate succeeded.
    #[error("Client is not authenticated")]
    NotAuthenticated,

    /// The event socket could not be opened or failed.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Generic backend error.
    #[error("Client error: {0}")]
    Other(String),
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ConnectionFailed { .. }
            | ClientError::Timeout { .. }
            | ClientError::WebSocket(_) => ErrorCategory::Network,
            ClientError::Tls { .. } => ErrorCategory::Configuration,
            ClientError::HttpStatus { status, .. } => match *status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::User,
            },
            ClientError::InvalidResponse { .. } => ErrorCategory::Server,
            ClientError::AuthRejected { .. } | ClientError::NotAuthenticated => {
                ErrorCategory::Auth
            }
            ClientError::Other(_) => ErrorCategory::System,
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            other => other.category().is_retryable(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ConnectionFailed { .. } => "E_NET_CONN",
            ClientError::Timeout { .. } => "E_NET_TIMEOUT",
            ClientError::Tls { .. } => "E_NET_TLS",
            ClientError::HttpStatus { .. } => "E_NET_HTTP",
            ClientError::InvalidResponse { .. } => "E_NET_INVALID",
            ClientError::AuthRejected { .. } => "E_AUTH_REJECTED",
            ClientError::NotAuthenticated => "E_AUTH_MISSING",
            ClientError::WebSocket(_) => "E_NET_WS",
            ClientError::Other(_) => "E_CLIENT_OTHER",
        }
    }
}

/// Classify a reqwest error into a [`ClientError`].
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> ClientError {
    if err.is_connect() {
        ClientError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        ClientError::Timeout {
            operation: format!("Request to {}", url),
        }
    } else if let Some(status) = err.status() {
        ClientError::HttpStatus {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else if err.is_decode() {
        ClientError::InvalidResponse {
            message: format!("Failed to decode response: {}", err),
        }
    } else {
        let err_str = err.to_string().to_lowercase();
        if err_str.contains("tls") || err_str.contains("ssl") || err_str.contains("certificate")
        {
            ClientError::Tls {
                message: err.to_string(),
            }
        } else {
            ClientError::Other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::ConnectionFailed {
            url: "http://media.local:8096".to_string(),
            message: "refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Connection to http://media.local:8096 failed: refused"
        );
        assert_eq!(
            ClientError::AuthRejected {
                username: "alice".to_string()
            }
            .to_string(),
            "Login rejected for user 'alice'"
        );
    }

    #[test]
    fn test_http_status_retryable() {
        let server = ClientError::HttpStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(server.is_retryable());
        assert_eq!(server.category(), ErrorCategory::Server);

        let unauthorized = ClientError::HttpStatus {
            status: 401,
            message: "nope".to_string(),
        };
        assert!(!unauthorized.is_retryable());
        assert_eq!(unauthorized.category(), ErrorCategory::Auth);

        let throttled = ClientError::HttpStatus {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(throttled.is_retryable());
    }

    #[test]
    fn test_auth_errors_not_retryable() {
        assert!(!ClientError::NotAuthenticated.is_retryable());
        assert!(!ClientError::AuthRejected {
            username: "bob".to_string()
        }
        .is_retryable());
        assert!(ClientError::WebSocket("closed".to_string()).is_retryable());
    }

    #[test]
    fn test_error_codes_unique() {
        let errors = vec![
            ClientError::ConnectionFailed {
                url: String::new(),
                message: String::new(),
            },
            ClientError::Timeout {
                operation: String::new(),
            },
            ClientError::Tls {
                message: String::new(),
            },
            ClientError::HttpStatus {
                status: 500,
                message: String::new(),
            },
            ClientError::InvalidResponse {
                message: String::new(),
            },
            ClientError::AuthRejected {
                username: String::new(),
            },
            ClientError::NotAuthenticated,
            ClientError::WebSocket(String::new()),
            ClientError::Other(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
