//! Mock media server for testing.
//!
//! [`MockBackend`] plays the server: it holds accounts, issued tokens, the
//! library and every open event stream. [`MockMediaClient`] is a client
//! handle talking to it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::models::{
    Capabilities, ClientEvent, ConnectionState, Item, ItemQuery, ServerCredentials, ServerRecord,
};
use crate::traits::{EventReceiver, MediaClient};

/// Server id reported by every mock backend unless overridden.
pub const MOCK_SERVER_ID: &str = "mock-server-id";

#[derive(Debug)]
struct BackendState {
    server_id: String,
    server_name: String,
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    reachable: bool,
    start_should_fail: bool,
    disconnect_next_start: bool,
    items: Vec<Item>,
    playlists: Vec<(String, Vec<String>)>,
    login_addresses: Vec<String>,
    streams: HashMap<usize, mpsc::Sender<ClientEvent>>,
    capabilities_posted: usize,
    authenticate_calls: usize,
}

/// Shared state of a fake server.
///
/// # Example
///
/// ```ignore
/// use themefinder::adapters::mock::{MockBackend, MockClientFactory};
///
/// let backend = MockBackend::new();
/// backend.add_user("alice", "secret");
/// let factory = MockClientFactory::new(backend.clone());
///
/// // ... connect a manager through the factory ...
///
/// // Drop every event socket
/// backend.disconnect_all();
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
    next_client: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                server_id: MOCK_SERVER_ID.to_string(),
                server_name: "Mock server".to_string(),
                users: HashMap::new(),
                tokens: HashSet::new(),
                reachable: true,
                start_should_fail: false,
                disconnect_next_start: false,
                items: Vec::new(),
                playlists: Vec::new(),
                login_addresses: Vec::new(),
                streams: HashMap::new(),
                capabilities_posted: 0,
                authenticate_calls: 0,
            })),
            next_client: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a backend reporting a specific server id.
    pub fn with_server_id(server_id: &str) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().server_id = server_id.to_string();
        backend
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
    }

    /// Make every call fail as if the server were down.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().reachable = reachable;
    }

    /// Configure whether opening the event stream fails.
    pub fn set_start_should_fail(&self, should_fail: bool) {
        self.state.lock().unwrap().start_should_fail = should_fail;
    }

    /// Make the next event stream report a disconnect before anything else,
    /// as if the socket dropped right after opening.
    pub fn disconnect_next_start(&self) {
        self.state.lock().unwrap().disconnect_next_start = true;
    }

    /// Register an already-issued token, as if a previous run had logged in.
    pub fn accept_token(&self, token: &str) {
        self.state.lock().unwrap().tokens.insert(token.to_string());
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    pub fn add_item(&self, item: Item) {
        self.state.lock().unwrap().items.push(item);
    }

    /// Playlists created so far, as (name, item ids).
    pub fn playlists(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().playlists.clone()
    }

    /// Addresses passed to `login`, in order.
    pub fn login_addresses(&self) -> Vec<String> {
        self.state.lock().unwrap().login_addresses.clone()
    }

    /// Number of open event streams.
    pub fn open_streams(&self) -> usize {
        self.state.lock().unwrap().streams.len()
    }

    pub fn capabilities_posted(&self) -> usize {
        self.state.lock().unwrap().capabilities_posted
    }

    pub fn authenticate_calls(&self) -> usize {
        self.state.lock().unwrap().authenticate_calls
    }

    /// Drop every event socket: each open stream receives one
    /// [`ClientEvent::Disconnected`].
    pub fn disconnect_all(&self) {
        let streams: Vec<_> = self.state.lock().unwrap().streams.drain().collect();
        for (_, tx) in streams {
            let _ = tx.try_send(ClientEvent::Disconnected);
        }
    }

    /// Push a server message to every open stream.
    pub fn emit(&self, name: &str, data: Value) {
        let streams: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .streams
            .values()
            .cloned()
            .collect();
        for tx in streams {
            let _ = tx.try_send(ClientEvent::Message {
                name: name.to_string(),
                data: data.clone(),
            });
        }
    }

    fn next_client_id(&self) -> usize {
        self.next_client.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct AuthState {
    address: String,
    user_id: String,
}

/// Client handle to a [`MockBackend`].
#[derive(Debug)]
pub struct MockMediaClient {
    id: usize,
    backend: MockBackend,
    auth: Mutex<Option<AuthState>>,
    events: Mutex<Option<mpsc::Sender<ClientEvent>>>,
    stopped: AtomicBool,
}

impl MockMediaClient {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            id: backend.next_client_id(),
            backend,
            auth: Mutex::new(None),
            events: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn require_auth(&self) -> Result<AuthState, ClientError> {
        self.auth
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    fn require_reachable(&self, address: &str) -> Result<(), ClientError> {
        if self.backend.state.lock().unwrap().reachable {
            Ok(())
        } else {
            Err(ClientError::ConnectionFailed {
                url: address.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }
}

#[async_trait]
impl MediaClient for MockMediaClient {
    async fn login(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<ServerCredentials, ClientError> {
        self.require_reachable(address)?;
        let mut state = self.backend.state.lock().unwrap();
        state.login_addresses.push(address.to_string());
        if state.users.get(username).map(String::as_str) != Some(password) {
            return Err(ClientError::AuthRejected {
                username: username.to_string(),
            });
        }

        let token = format!("token-{}-{}", username, self.id);
        state.tokens.insert(token.clone());
        let user_id = format!("user-{}", username);
        *self.auth.lock().unwrap() = Some(AuthState {
            address: address.to_string(),
            user_id: user_id.clone(),
        });

        Ok(ServerCredentials {
            server_id: state.server_id.clone(),
            server_name: Some(state.server_name.clone()),
            address: address.to_string(),
            user_id,
            access_token: token,
        })
    }

    async fn authenticate(&self, record: &ServerRecord) -> Result<ConnectionState, ClientError> {
        let mut state = self.backend.state.lock().unwrap();
        state.authenticate_calls += 1;
        if !state.reachable {
            return Ok(ConnectionState::Unavailable);
        }
        let valid = record
            .access_token
            .as_ref()
            .is_some_and(|token| state.tokens.contains(token));
        if !valid {
            return Ok(ConnectionState::ServerSignIn);
        }

        *self.auth.lock().unwrap() = Some(AuthState {
            address: record.address.clone(),
            user_id: record.user_id.clone().unwrap_or_default(),
        });
        Ok(ConnectionState::SignedIn)
    }

    async fn start(&self) -> Result<EventReceiver, ClientError> {
        let auth = self.require_auth()?;
        let mut state = self.backend.state.lock().unwrap();
        if state.start_should_fail || !state.reachable {
            return Err(ClientError::WebSocket(format!(
                "could not open socket to {}",
                auth.address
            )));
        }
        let (tx, rx) = mpsc::channel(32);
        if std::mem::take(&mut state.disconnect_next_start) {
            let _ = tx.try_send(ClientEvent::Disconnected);
            return Ok(rx);
        }
        state.streams.insert(self.id, tx.clone());
        *self.events.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn post_capabilities(&self, _capabilities: &Capabilities) -> Result<(), ClientError> {
        self.require_auth()?;
        self.backend.state.lock().unwrap().capabilities_posted += 1;
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.events.lock().unwrap().take();
        self.backend.state.lock().unwrap().streams.remove(&self.id);
    }

    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<Item>, ClientError> {
        let auth = self.require_auth()?;
        self.require_reachable(&auth.address)?;
        let state = self.backend.state.lock().unwrap();
        let term = query.search_term.as_ref().map(|t| t.to_lowercase());
        let items = state
            .items
            .iter()
            .filter(|item| match term {
                Some(ref term) => item.name.to_lowercase().contains(term),
                None => true,
            })
            .filter(|item| {
                let kind = item.item_type.as_deref().unwrap_or_default();
                (query.include_item_types.is_empty()
                    || query.include_item_types.iter().any(|t| t == kind))
                    && !query.exclude_item_types.iter().any(|t| t == kind)
            })
            .take(query.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> Result<Item, ClientError> {
        let auth = self.require_auth()?;
        self.require_reachable(&auth.address)?;
        self.backend
            .state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| ClientError::HttpStatus {
                status: 404,
                message: format!("item {} not found", id),
            })
    }

    async fn create_playlist(
        &self,
        name: &str,
        item_ids: &[String],
    ) -> Result<Option<String>, ClientError> {
        let auth = self.require_auth()?;
        self.require_reachable(&auth.address)?;
        let mut state = self.backend.state.lock().unwrap();
        state
            .playlists
            .push((name.to_string(), item_ids.to_vec()));
        Ok(Some(format!("playlist-{}-{}", auth.user_id, state.playlists.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let backend = MockBackend::new();
        backend.add_user("alice", "secret");

        let client = MockMediaClient::new(backend.clone());
        let creds = client
            .login("http://media.local:8096", "alice", "secret")
            .await
            .unwrap();
        assert_eq!(creds.server_id, MOCK_SERVER_ID);

        let record = ServerRecord::from_credentials("u1", "alice", creds);
        let other = MockMediaClient::new(backend.clone());
        assert_eq!(
            other.authenticate(&record).await.unwrap(),
            ConnectionState::SignedIn
        );

        backend.revoke_tokens();
        assert_eq!(
            other.authenticate(&record).await.unwrap(),
            ConnectionState::ServerSignIn
        );
    }

    #[tokio::test]
    async fn test_bad_password_rejected() {
        let backend = MockBackend::new();
        backend.add_user("alice", "secret");
        let client = MockMediaClient::new(backend);
        let err = client.login("http://x", "alice", "nope").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRejected { .. }));
    }

    #[tokio::test]
    async fn test_disconnect_and_stop() {
        let backend = MockBackend::new();
        backend.add_user("alice", "secret");
        let client = MockMediaClient::new(backend.clone());
        client.login("http://x", "alice", "secret").await.unwrap();

        let mut rx = client.start().await.unwrap();
        assert_eq!(backend.open_streams(), 1);
        backend.disconnect_all();
        assert_eq!(rx.recv().await, Some(ClientEvent::Disconnected));

        let mut rx = client.start().await.unwrap();
        client.stop();
        assert_eq!(rx.recv().await, None);
        assert!(client.is_stopped());
    }
}
