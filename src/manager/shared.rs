//! State shared between the manager and its session tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, Notify};
use tracing::debug;

use crate::error::StoreError;
use crate::models::ServerRecord;
use crate::session::recovery::spawn_listener;
use crate::session::{ClientHandle, ManagerEvent, Session, SessionEvent, SessionState};
use crate::startup::ManagerConfig;
use crate::traits::{ClientFactory, CredentialStore, EventReceiver, MediaClient};

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub(crate) struct Shared {
    pub(crate) config: ManagerConfig,
    pub(crate) factory: Arc<dyn ClientFactory>,
    store: Arc<dyn CredentialStore>,
    /// Live sessions by uuid.
    sessions: Mutex<HashMap<String, Session>>,
    /// Source of truth for persistence.
    records: Mutex<Vec<ServerRecord>>,
    /// Sessions currently recovering or given up. Live sessions are not
    /// tracked here.
    recovery_states: Mutex<HashMap<String, SessionState>>,
    stopping: AtomicBool,
    /// Wakes backoff waits when the stopping flag or the record list
    /// changes.
    wake: Notify,
    events: broadcast::Sender<ManagerEvent>,
    generation: AtomicU64,
}

impl Shared {
    pub(crate) fn new(
        config: ManagerConfig,
        factory: Arc<dyn ClientFactory>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            factory,
            store,
            sessions: Mutex::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
            recovery_states: Mutex::new(HashMap::new()),
            stopping: AtomicBool::new(false),
            wake: Notify::new(),
            events,
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub(crate) fn set_stopping(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, uuid: &str, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(ManagerEvent::new(uuid, event));
    }

    /// Register a freshly authenticated client as the live session for
    /// `record` and start listening to its events.
    ///
    /// Any previous session for the same uuid is torn down first, so at most
    /// one client is live per record. Returns false if the manager started
    /// stopping in the meantime; the new session is torn down again in that
    /// case.
    pub(crate) async fn register(
        self: &Arc<Self>,
        record: &ServerRecord,
        client: Arc<dyn MediaClient>,
        events: EventReceiver,
    ) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let previous = {
            let mut sessions = self.sessions.lock().await;
            let listener = spawn_listener(self.clone(), record.uuid.clone(), generation, events);
            let session = Session::new(
                record.uuid.clone(),
                record.username.clone(),
                client,
                generation,
                listener,
            );
            sessions.insert(record.uuid.clone(), session)
        };
        if let Some(previous) = previous {
            debug!("Replacing existing session for {}", record.uuid);
            previous.shutdown();
        }
        self.recovery_states.lock().await.remove(&record.uuid);

        if self.is_stopping() {
            if let Some(session) = self.take_session(&record.uuid).await {
                session.shutdown();
            }
            return false;
        }
        true
    }

    pub(crate) async fn take_session(&self, uuid: &str) -> Option<Session> {
        self.sessions.lock().await.remove(uuid)
    }

    /// Remove the session only if it is still the one started with
    /// `generation`.
    pub(crate) async fn take_session_if(&self, uuid: &str, generation: u64) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(uuid) {
            Some(session) if session.generation() == generation => sessions.remove(uuid),
            _ => None,
        }
    }

    pub(crate) async fn take_all_sessions(&self) -> Vec<Session> {
        self.sessions.lock().await.drain().map(|(_, s)| s).collect()
    }

    pub(crate) async fn has_session(&self, uuid: &str) -> bool {
        self.sessions.lock().await.contains_key(uuid)
    }

    pub(crate) async fn session_handle(&self, uuid: &str) -> Option<ClientHandle> {
        self.sessions.lock().await.get(uuid).map(Session::handle)
    }

    pub(crate) async fn session_handles(&self) -> Vec<ClientHandle> {
        self.sessions.lock().await.values().map(Session::handle).collect()
    }

    pub(crate) async fn session_username(&self, uuid: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .get(uuid)
            .map(|s| s.username().to_string())
            .filter(|name| !name.is_empty())
    }

    pub(crate) async fn set_recovery_state(&self, uuid: &str, state: SessionState) {
        self.recovery_states
            .lock()
            .await
            .insert(uuid.to_string(), state);
    }

    pub(crate) async fn clear_recovery_state(&self, uuid: &str) {
        self.recovery_states.lock().await.remove(uuid);
    }

    pub(crate) async fn session_state(&self, uuid: &str) -> Option<SessionState> {
        if self.has_session(uuid).await {
            return Some(SessionState::Connected);
        }
        self.recovery_states.lock().await.get(uuid).copied()
    }

    /// Sleep for `delay`, waking early on stop or removal of the record.
    ///
    /// Returns false if recovery should be abandoned.
    pub(crate) async fn wait_for_retry(&self, uuid: &str, delay: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + delay;
        loop {
            let woken = self.wake.notified();
            if self.is_stopping() || !self.has_record(uuid).await {
                return false;
            }
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    return !self.is_stopping();
                }
                _ = woken => {}
            }
        }
    }

    pub(crate) async fn records(&self) -> Vec<ServerRecord> {
        self.records.lock().await.clone()
    }

    pub(crate) async fn record(&self, uuid: &str) -> Option<ServerRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.uuid == uuid)
            .cloned()
    }

    pub(crate) async fn has_record(&self, uuid: &str) -> bool {
        self.records.lock().await.iter().any(|r| r.uuid == uuid)
    }

    pub(crate) async fn record_username(&self, uuid: &str) -> Option<String> {
        self.record(uuid)
            .await
            .map(|r| r.username)
            .filter(|name| !name.is_empty())
    }

    pub(crate) async fn set_connected(&self, uuid: &str, connected: bool) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.iter_mut().find(|r| r.uuid == uuid) {
            record.connected = connected;
        }
    }

    /// Replace the in-memory list from the store.
    pub(crate) async fn load_records(&self) -> Result<usize, StoreError> {
        let loaded = self.store.load().await?;
        let count = loaded.len();
        *self.records.lock().await = loaded;
        self.wake.notify_waiters();
        Ok(count)
    }

    /// Insert or replace (by uuid) a record in memory. Nothing is written
    /// until [`save_records`](Self::save_records).
    pub(crate) async fn insert_record(&self, record: ServerRecord) {
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.uuid == record.uuid) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Persist the in-memory list as it is now.
    pub(crate) async fn save_records(&self) -> Result<(), StoreError> {
        let records = self.records.lock().await;
        self.store.save(&records).await
    }

    /// Delete a record and persist. Returns false (and writes nothing) if
    /// no record had that uuid.
    pub(crate) async fn remove_record(&self, uuid: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.uuid != uuid);
        if records.len() == before {
            return Ok(false);
        }
        let saved = self.store.save(&records).await;
        drop(records);
        self.wake.notify_waiters();
        saved.map(|_| true)
    }

    /// Drop every record and persist the empty list.
    pub(crate) async fn clear_records(&self) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.clear();
        let saved = self.store.save(&records).await;
        drop(records);
        self.wake.notify_waiters();
        saved
    }
}
