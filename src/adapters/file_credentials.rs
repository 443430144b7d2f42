//! File-based credential store adapter.
//!
//! Wraps the [`CredentialsManager`] and runs its blocking file I/O off the
//! async runtime.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::auth::CredentialsManager;
use crate::error::{ConfigError, StoreError};
use crate::models::ServerRecord;
use crate::traits::CredentialStore;

/// File-based credential store.
///
/// The server list is stored in `~/.theme-finder/cred.json` unless another
/// path is given.
///
/// # Example
///
/// ```ignore
/// use themefinder::adapters::FileCredentialStore;
/// use themefinder::traits::CredentialStore;
///
/// let store = FileCredentialStore::with_path(config.credentials_path.clone());
/// let records = store.load().await?;
/// store.save(&records).await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    manager: CredentialsManager,
}

impl FileCredentialStore {
    /// Store at the default location.
    pub fn new() -> Result<Self, ConfigError> {
        CredentialsManager::new().map(|manager| Self { manager })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            manager: CredentialsManager::with_path(path),
        }
    }

    pub fn credentials_path(&self) -> &Path {
        self.manager.credentials_path()
    }

    fn join_error(&self, err: tokio::task::JoinError) -> StoreError {
        StoreError::Io {
            path: self.manager.credentials_path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, err.to_string()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Vec<ServerRecord>, StoreError> {
        let manager = self.manager.clone();
        tokio::task::spawn_blocking(move || manager.load())
            .await
            .map_err(|e| self.join_error(e))?
    }

    async fn save(&self, records: &[ServerRecord]) -> Result<(), StoreError> {
        let manager = self.manager.clone();
        let records = records.to_vec();
        tokio::task::spawn_blocking(move || manager.save(&records))
            .await
            .map_err(|e| self.join_error(e))?
    }
}
