//! Server-side models: persisted records, login results, and the events a
//! live client emits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted server entry.
///
/// Field names follow the on-disk format written by earlier releases so
/// existing credential files keep loading. Unknown fields are carried
/// through `extra` and written back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerRecord {
    /// Stable identifier of this connection.
    #[serde(default)]
    pub uuid: String,
    /// Normalized server URL.
    #[serde(default)]
    pub address: String,
    /// Account name used at login. Empty for migrated entries.
    #[serde(default)]
    pub username: String,
    /// Last known connectivity. Recomputed on each connect attempt.
    #[serde(default)]
    pub connected: bool,
    /// Backend server id.
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "AccessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "UserId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(
        rename = "DateLastAccessed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_last_accessed: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerRecord {
    /// Build a record from a successful login.
    pub fn from_credentials(
        uuid: impl Into<String>,
        username: impl Into<String>,
        creds: ServerCredentials,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            address: creds.address,
            username: username.into(),
            connected: false,
            server_id: Some(creds.server_id),
            name: creds.server_name,
            access_token: Some(creds.access_token),
            user_id: Some(creds.user_id),
            date_last_accessed: Some(
                chrono::Utc::now()
                    .format("%Y-%m-%dT%H:%M:%SZ")
                    .to_string(),
            ),
            extra: Map::new(),
        }
    }

    /// Label for logs: server name when known, otherwise the address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

/// What the backend hands back after a successful username/password login.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerCredentials {
    pub server_id: String,
    pub server_name: Option<String>,
    pub address: String,
    pub user_id: String,
    pub access_token: String,
}

/// Result of authenticating a stored record against its server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Token accepted.
    SignedIn,
    /// Server reachable but the stored token is missing or rejected.
    ServerSignIn,
    /// Server could not be reached.
    Unavailable,
}

/// Event emitted by a live client's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A server message, forwarded verbatim.
    Message { name: String, data: Value },
    /// The event socket was lost.
    Disconnected,
}

/// Capability announcement pushed to the server after connecting.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Capabilities {
    pub playable_media_types: Vec<String>,
    pub supports_media_control: bool,
    pub supported_commands: Vec<String>,
}

impl Capabilities {
    /// The fixed announcement: no playback, no remote control.
    pub fn announcement() -> Self {
        Self {
            playable_media_types: Vec::new(),
            supports_media_control: false,
            supported_commands: Vec::new(),
        }
    }
}
