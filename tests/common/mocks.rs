//! Mock implementations for test fixtures.
//!
//! This module re-exports the mock implementations from
//! `themefinder::adapters::mock` and adds record fixtures.

pub use themefinder::adapters::mock::{
    InMemoryCredentialStore, MockBackend, MockClientFactory, MockMediaClient, MockThemeSource,
    MOCK_SERVER_ID,
};

use themefinder::models::ServerRecord;

/// A persisted record whose token the backend accepts, as if written by a
/// previous run.
pub fn stored_record(backend: &MockBackend, uuid: &str, username: &str) -> ServerRecord {
    let token = format!("stored-token-{}", uuid);
    backend.accept_token(&token);
    ServerRecord {
        uuid: uuid.to_string(),
        address: "http://media.local:8096".to_string(),
        username: username.to_string(),
        server_id: Some(MOCK_SERVER_ID.to_string()),
        access_token: Some(token),
        user_id: Some(format!("user-{}", username)),
        ..Default::default()
    }
}

/// A persisted record whose token the backend does not know.
pub fn stale_record(uuid: &str) -> ServerRecord {
    ServerRecord {
        uuid: uuid.to_string(),
        address: "http://media.local:8096".to_string(),
        username: "alice".to_string(),
        access_token: Some("revoked".to_string()),
        user_id: Some("user-alice".to_string()),
        ..Default::default()
    }
}
