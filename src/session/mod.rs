//! Sessions: one authenticated connection to one server, plus the
//! machinery that keeps it alive.
//!
//! A session is created when [`connect`] authenticates a stored record.
//! Its event listener forwards server messages to the manager's
//! subscribers. When the socket drops, the listener tears the session down
//! and runs the recovery loop in [`recovery`] until a reconnect succeeds,
//! the manager stops, or the server is removed.

pub mod backoff;
pub mod connect;
pub mod events;
pub mod recovery;
pub mod state;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::traits::MediaClient;

pub use backoff::{Backoff, DEFAULT_MAX_BACKOFF_SECS, MIN_BACKOFF_SECS};
pub use events::{ManagerEvent, SessionEvent};
pub use state::SessionState;

/// An authenticated client handed out to callers, tagged with the uuid of
/// the server record it belongs to.
#[derive(Clone)]
pub struct ClientHandle {
    uuid: String,
    client: Arc<dyn MediaClient>,
}

impl ClientHandle {
    pub fn new(uuid: impl Into<String>, client: Arc<dyn MediaClient>) -> Self {
        Self {
            uuid: uuid.into(),
            client,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn client(&self) -> &Arc<dyn MediaClient> {
        &self.client
    }

}

impl Deref for ClientHandle {
    type Target = dyn MediaClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("uuid", &self.uuid)
            .finish_non_exhaustive()
    }
}

/// A live session as held by the manager.
pub(crate) struct Session {
    uuid: String,
    username: String,
    client: Arc<dyn MediaClient>,
    /// Distinguishes this session from earlier ones for the same uuid, so a
    /// stale listener never tears down its successor.
    generation: u64,
    listener: Option<JoinHandle<()>>,
}

impl Session {
    pub(crate) fn new(
        uuid: String,
        username: String,
        client: Arc<dyn MediaClient>,
        generation: u64,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            uuid,
            username,
            client,
            generation,
            listener: Some(listener),
        }
    }

    pub(crate) fn handle(&self) -> ClientHandle {
        ClientHandle::new(self.uuid.clone(), self.client.clone())
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the client and cancel the listener.
    pub(crate) fn shutdown(mut self) {
        self.client.stop();
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }

    /// Stop the client but leave the listener running. Used by the listener
    /// itself when it takes over recovery.
    pub(crate) fn release(mut self) {
        self.client.stop();
        self.listener.take();
    }
}
