//! Client manager: owns every session and the persisted server list.
//!
//! The manager is cheap to clone; clones share state. Sessions are keyed by
//! the uuid of their [`ServerRecord`]. Consumers observe sessions through
//! [`ClientManager::subscribe`].
//!
//! # Example
//!
//! ```ignore
//! let manager = ClientManager::new(config, factory, store);
//! if !manager.try_connect().await? {
//!     manager.login("media.local", "alice", "secret", false).await?;
//! }
//! for handle in manager.clients().await {
//!     let items = handle.search_items(&ItemQuery::new().recursive()).await?;
//! }
//! manager.stop().await;
//! ```

pub(crate) mod shared;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::{LoginError, StoreError};
use crate::models::ServerRecord;
use crate::session::{self, ClientHandle, ManagerEvent, SessionState};
use crate::startup::ManagerConfig;
use crate::traits::{ClientFactory, CredentialStore};

use shared::Shared;

/// Poll interval of the startup connect-retry window.
pub const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Display name used when no username is known for a client.
pub const UNKNOWN_USERNAME: &str = "Unknown";

#[derive(Clone)]
pub struct ClientManager {
    shared: Arc<Shared>,
}

impl ClientManager {
    pub fn new(
        config: ManagerConfig,
        factory: Arc<dyn ClientFactory>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(config, factory, store)),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.shared.config
    }

    /// Subscribe to session events from every server.
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.shared.subscribe()
    }

    /// Load the persisted server list into memory, replacing what is there.
    ///
    /// Legacy files are migrated in memory; they are rewritten in the
    /// current shape on the next save.
    pub async fn load_credentials(&self) -> Result<usize, StoreError> {
        self.shared.load_records().await
    }

    /// Startup connect: load the server list and connect everything.
    ///
    /// If nothing connects and a retry window is configured, retry every
    /// [`CONNECT_RETRY_INTERVAL`] for `connect_retry_mins` minutes, stopping
    /// at the first success. A malformed credentials file is an error.
    pub async fn try_connect(&self) -> Result<bool, StoreError> {
        self.load_credentials().await?;

        let mut logged_in = self.connect_all().await;
        let retry_mins = self.shared.config.connect_retry_mins;
        if retry_mins > 0 && !logged_in {
            warn!("Connection failed. Will retry for {} minutes.", retry_mins);
            let polls = retry_mins * 60 / CONNECT_RETRY_INTERVAL.as_secs();
            for _ in 0..polls {
                tokio::time::sleep(CONNECT_RETRY_INTERVAL).await;
                if self.is_stopping() {
                    break;
                }
                logged_in = self.connect_all().await;
                if logged_in {
                    break;
                }
            }
        }
        Ok(logged_in)
    }

    /// Connect every persisted server. True if at least one succeeded.
    pub async fn connect_all(&self) -> bool {
        let mut logged_in = false;
        for mut record in self.shared.records().await {
            if session::connect::connect(&self.shared, &mut record).await {
                logged_in = true;
            }
        }
        logged_in
    }

    /// Log in to a server and add it. See [`session::connect`] for the
    /// `force_unique` policy.
    pub async fn login(
        &self,
        address: &str,
        username: &str,
        password: &str,
        force_unique: bool,
    ) -> Result<ClientHandle, LoginError> {
        session::connect::login(&self.shared, address, username, password, force_unique).await
    }

    /// Forget a server: drop its record, persist, and tear down its session.
    ///
    /// Unknown uuids are a no-op.
    pub async fn remove(&self, uuid: &str) -> Result<(), StoreError> {
        let removed = self.shared.remove_record(uuid).await;
        if let Some(session) = self.shared.take_session(uuid).await {
            session.shutdown();
        }
        self.shared.clear_recovery_state(uuid).await;
        if let Ok(true) = removed {
            info!("Removed server {}", uuid);
        }
        removed.map(|_| ())
    }

    /// Tear down every session and clear the persisted list.
    pub async fn remove_all(&self) -> Result<(), StoreError> {
        for session in self.shared.take_all_sessions().await {
            session.shutdown();
        }
        self.shared.clear_records().await
    }

    /// Stop for good: no further connects or reconnects, every session torn
    /// down. A stopped manager cannot be restarted.
    pub async fn stop(&self) {
        self.shared.set_stopping();
        for session in self.shared.take_all_sessions().await {
            session.shutdown();
        }
        info!("Client manager stopped");
    }

    pub fn is_stopping(&self) -> bool {
        self.shared.is_stopping()
    }

    /// Display name for a client: the session's username, else the
    /// persisted record's, else `"Unknown"`.
    pub async fn username_for(&self, handle: &ClientHandle) -> String {
        if let Some(name) = self.shared.session_username(handle.uuid()).await {
            return name;
        }
        self.shared
            .record_username(handle.uuid())
            .await
            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string())
    }

    /// Handles for every live session.
    pub async fn clients(&self) -> Vec<ClientHandle> {
        self.shared.session_handles().await
    }

    /// Handle for one live session.
    pub async fn client(&self, uuid: &str) -> Option<ClientHandle> {
        self.shared.session_handle(uuid).await
    }

    /// Snapshot of the persisted server list.
    pub async fn records(&self) -> Vec<ServerRecord> {
        self.shared.records().await
    }

    pub async fn session_state(&self, uuid: &str) -> Option<SessionState> {
        self.shared.session_state(uuid).await
    }

    pub async fn is_connected(&self, uuid: &str) -> bool {
        self.shared.has_session(uuid).await
    }
}
