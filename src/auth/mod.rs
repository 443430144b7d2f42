//! Server credentials: the persisted record list, address normalization,
//! and the identity this application presents to servers.

pub mod address;
pub mod credentials;
pub mod identity;

pub use address::{normalize_address, ServerAddress, DEFAULT_HTTP_PORT};
pub use credentials::{CredentialsManager, StoredServers};
pub use identity::{ClientIdentity, APP_NAME, CLIENT_VERSION, USER_AGENT};
