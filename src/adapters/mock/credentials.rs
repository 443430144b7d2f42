//! In-memory credential store for testing.
//!
//! Keeps the server list in memory and counts writes, so tests can check
//! when the manager persists without touching the file system.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::models::ServerRecord;
use crate::traits::CredentialStore;

/// In-memory credential store for testing.
///
/// # Example
///
/// ```ignore
/// use themefinder::adapters::mock::InMemoryCredentialStore;
/// use themefinder::traits::CredentialStore;
///
/// let store = InMemoryCredentialStore::new();
/// store.save(&records).await?;
/// assert_eq!(store.save_count(), 1);
/// assert_eq!(store.load().await?, records);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    records: Arc<Mutex<Vec<ServerRecord>>>,
    saves: Arc<Mutex<usize>>,
    load_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    pub fn with_records(records: Vec<ServerRecord>) -> Self {
        let store = Self::new();
        *store.records.lock().unwrap() = records;
        store
    }

    /// What was last saved (or seeded).
    pub fn stored(&self) -> Vec<ServerRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    /// Make `load` report a malformed file.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Vec<ServerRecord>, StoreError> {
        if *self.load_should_fail.lock().unwrap() {
            let source = serde_json::from_str::<Vec<ServerRecord>>("{not json")
                .expect_err("literal is malformed");
            return Err(StoreError::Malformed {
                path: "memory".into(),
                source,
            });
        }
        Ok(self.stored())
    }

    async fn save(&self, records: &[ServerRecord]) -> Result<(), StoreError> {
        *self.records.lock().unwrap() = records.to_vec();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
