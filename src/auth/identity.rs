//! Application identity presented to media servers.

/// Application name shown in the server's device list.
pub const APP_NAME: &str = "Jellyfin musical theme finder";

pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USER_AGENT: &str = concat!("jellyfin-musical-theme-finder/", env!("CARGO_PKG_VERSION"));

/// Identity of one client instance.
///
/// Every instance gets its own device id, so several connections to the
/// same server show up as separate devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub app_name: String,
    pub version: String,
    pub device_name: String,
    pub device_id: String,
}

impl ClientIdentity {
    /// Identity with the fixed app name and version and a fresh device id.
    pub fn generate() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            version: CLIENT_VERSION.to_string(),
            device_name: APP_NAME.to_string(),
            device_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Value of the `Authorization` header, with the token once known.
    pub fn authorization_header(&self, token: Option<&str>) -> String {
        let mut header = format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            self.app_name, self.device_name, self.device_id, self.version
        );
        if let Some(token) = token {
            header.push_str(&format!(", Token=\"{}\"", token));
        }
        header
    }
}
