//! Media server client trait abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::models::{
    Capabilities, ClientEvent, ConnectionState, Item, ItemQuery, ServerCredentials, ServerRecord,
};

/// Receiving end of a client's event stream.
pub type EventReceiver = mpsc::Receiver<ClientEvent>;

/// One client handle to a media server.
///
/// A handle starts unauthenticated. Either [`login`](Self::login) or
/// [`authenticate`](Self::authenticate) binds it to a server; after that
/// the catalog calls work and [`start`](Self::start) opens the event
/// stream. Network calls are expected to time out on their own.
#[async_trait]
pub trait MediaClient: Send + Sync {
    /// Log in with username and password against `address`.
    ///
    /// Fails with [`ClientError::AuthRejected`] when the server does not
    /// hand out an access token.
    async fn login(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<ServerCredentials, ClientError>;

    /// Reuse a stored token. The address is already known, so no server
    /// discovery happens.
    async fn authenticate(&self, record: &ServerRecord) -> Result<ConnectionState, ClientError>;

    /// Open the server event stream.
    ///
    /// The stream yields [`ClientEvent::Disconnected`] once when the socket
    /// is lost and then ends. It ends without that event after
    /// [`stop`](Self::stop).
    async fn start(&self) -> Result<EventReceiver, ClientError>;

    /// Announce what this client can do.
    async fn post_capabilities(&self, capabilities: &Capabilities) -> Result<(), ClientError>;

    /// Close the event stream and release the connection.
    fn stop(&self);

    /// Search the user's library.
    async fn search_items(&self, query: &ItemQuery) -> Result<Vec<Item>, ClientError>;

    /// Fetch one item with its paths.
    async fn get_item(&self, id: &str) -> Result<Item, ClientError>;

    /// Create a playlist for the logged in user. Returns the new playlist
    /// id when the server reports one.
    async fn create_playlist(
        &self,
        name: &str,
        item_ids: &[String],
    ) -> Result<Option<String>, ClientError>;
}
