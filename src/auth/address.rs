//! Server address normalization.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::LoginError;

/// Port assumed for plain-http addresses without an explicit port.
pub const DEFAULT_HTTP_PORT: u16 = 8096;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([^/:]+)(:[0-9]+)?(/.*)?$").expect("address pattern is valid")
});

/// A server URL split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// `http://` or `https://`.
    pub protocol: String,
    pub host: String,
    /// Including the leading colon, e.g. `:8096`.
    pub port: Option<String>,
    /// Including the leading slash.
    pub path: Option<String>,
}

impl ServerAddress {
    /// Parse an address, filling in defaults.
    ///
    /// A single trailing slash is dropped. A missing protocol becomes
    /// `http://`; plain http without a port gets `:8096`, the media
    /// server's default, rather than 80. Both defaults log a warning.
    pub fn parse(raw: &str) -> Result<Self, LoginError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let caps = ADDRESS_RE
            .captures(trimmed)
            .ok_or_else(|| LoginError::InvalidAddress(raw.to_string()))?;

        let mut protocol = caps.get(1).map(|m| m.as_str().to_string());
        let host = caps[2].to_string();
        let mut port = caps.get(3).map(|m| m.as_str().to_string());
        let path = caps.get(4).map(|m| m.as_str().to_string());

        if protocol.is_none() {
            warn!("Adding http:// because it was not provided.");
            protocol = Some("http://".to_string());
        }

        if protocol.as_deref() == Some("http://") && port.is_none() {
            warn!("Adding port {} for insecure local http connection.", DEFAULT_HTTP_PORT);
            warn!("If you want to connect to standard http port 80, use :80 in the url.");
            port = Some(format!(":{}", DEFAULT_HTTP_PORT));
        }

        Ok(Self {
            protocol: protocol.unwrap_or_default(),
            host,
            port,
            path,
        })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.protocol, self.host)?;
        if let Some(ref port) = self.port {
            f.write_str(port)?;
        }
        if let Some(ref path) = self.path {
            f.write_str(path)?;
        }
        Ok(())
    }
}

/// Normalize a user-supplied server address into a full URL.
pub fn normalize_address(raw: &str) -> Result<String, LoginError> {
    ServerAddress::parse(raw).map(|a| a.to_string())
}
