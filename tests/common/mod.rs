//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! let harness = TestHarness::builder().with_user("alice", "secret").build();
//! harness.manager.login("media.local", "alice", "secret", false).await?;
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use themefinder::manager::ClientManager;
use themefinder::models::ServerRecord;
use themefinder::session::{ManagerEvent, SessionEvent};
use themefinder::startup::ManagerConfig;

/// A manager wired to mocks, with handles on every mock.
pub struct TestHarness {
    pub backend: MockBackend,
    pub factory: Arc<MockClientFactory>,
    pub store: InMemoryCredentialStore,
    pub manager: ClientManager,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }
}

#[derive(Default)]
pub struct TestHarnessBuilder {
    config: ManagerConfig,
    users: Vec<(String, String)>,
    records: Vec<ServerRecord>,
    backend: Option<MockBackend>,
}

impl TestHarnessBuilder {
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    /// Seed the credential store.
    pub fn with_records(mut self, records: Vec<ServerRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn with_backend(mut self, backend: MockBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> TestHarness {
        let backend = self.backend.unwrap_or_default();
        for (username, password) in &self.users {
            backend.add_user(username, password);
        }
        let factory = Arc::new(MockClientFactory::new(backend.clone()));
        let store = InMemoryCredentialStore::with_records(self.records);
        let manager = ClientManager::new(self.config, factory.clone(), Arc::new(store.clone()));
        TestHarness {
            backend,
            factory,
            store,
            manager,
        }
    }
}

/// Wait for the next event matching `kind`, skipping others.
pub async fn next_event(
    events: &mut broadcast::Receiver<ManagerEvent>,
    kind: &SessionEvent,
) -> ManagerEvent {
    tokio::time::timeout(Duration::from_secs(3600), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if &event.kind == kind {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
