//! Credential store trait abstraction.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::ServerRecord;

/// Durable storage for the server list.
///
/// The stored list is the only durable state; it is rewritten in full after
/// every mutation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the list. Missing storage is an empty list; malformed storage
    /// is an error.
    async fn load(&self) -> Result<Vec<ServerRecord>, StoreError>;

    /// Replace the stored list.
    async fn save(&self, records: &[ServerRecord]) -> Result<(), StoreError>;
}
