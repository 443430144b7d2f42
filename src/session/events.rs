//! Events published by sessions to the manager's subscribers.

use serde_json::Value;

/// What happened to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The event socket was lost; recovery has started.
    Disconnected,
    /// Recovery succeeded; the session is live again.
    Reconnected,
    /// A server message, forwarded verbatim.
    Other { name: String, data: Value },
}

/// A [`SessionEvent`] tagged with the session it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerEvent {
    pub uuid: String,
    pub kind: SessionEvent,
}

impl ManagerEvent {
    pub fn new(uuid: impl Into<String>, kind: SessionEvent) -> Self {
        Self {
            uuid: uuid.into(),
            kind,
        }
    }
}
