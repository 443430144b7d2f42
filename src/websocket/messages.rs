use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server asks the client to send keep-alives; `Data` is the timeout in
/// seconds.
pub const FORCE_KEEP_ALIVE: &str = "ForceKeepAlive";
/// Keep-alive ping and its echo.
pub const KEEP_ALIVE: &str = "KeepAlive";

/// One frame on the server event socket.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SocketMessage {
    #[serde(rename = "MessageType")]
    pub message_type: String,
    #[serde(rename = "Data", default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl SocketMessage {
    pub fn keep_alive() -> Self {
        Self {
            message_type: KEEP_ALIVE.to_string(),
            data: Value::Null,
        }
    }

    pub fn is_keep_alive(&self) -> bool {
        self.message_type == KEEP_ALIVE
    }

    /// Interval at which to send keep-alives, if this is a
    /// `ForceKeepAlive` request. Half the server's timeout, at least 1s.
    pub fn keep_alive_interval(&self) -> Option<Duration> {
        if self.message_type != FORCE_KEEP_ALIVE {
            return None;
        }
        let timeout = self.data.as_u64().unwrap_or(60);
        Some(Duration::from_secs((timeout / 2).max(1)))
    }
}
