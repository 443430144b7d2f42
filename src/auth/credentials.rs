//! Persisted server list.
//!
//! The list lives in a flat JSON file, `~/.theme-finder/cred.json` by
//! default. Two shapes are accepted on load:
//!
//! - current: a bare array of [`ServerRecord`]s
//! - legacy: `{"Servers": [...]}`, migrated on load by giving every entry a
//!   fresh uuid and an empty username
//!
//! Only the current shape is ever written.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ConfigError, StoreError};
use crate::models::ServerRecord;

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".theme-finder";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "cred.json";

/// Either on-disk shape of the server list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredServers {
    Current(Vec<ServerRecord>),
    Legacy {
        #[serde(rename = "Servers")]
        servers: Vec<ServerRecord>,
    },
}

impl StoredServers {
    /// Flatten into the in-memory list, migrating legacy entries and making
    /// sure every uuid is present and unique.
    pub fn into_records(self) -> Vec<ServerRecord> {
        let mut records = match self {
            StoredServers::Current(records) => records,
            StoredServers::Legacy { servers } => {
                debug!("Migrating {} legacy server entries", servers.len());
                servers
                    .into_iter()
                    .map(|mut server| {
                        server.uuid = uuid::Uuid::new_v4().to_string();
                        server.username = String::new();
                        server
                    })
                    .collect()
            }
        };

        let mut seen = HashSet::new();
        for record in &mut records {
            if record.uuid.is_empty() || !seen.insert(record.uuid.clone()) {
                warn!(
                    "Server entry for {} has a missing or duplicate uuid, assigning a new one",
                    record.address
                );
                record.uuid = uuid::Uuid::new_v4().to_string();
                seen.insert(record.uuid.clone());
            }
        }
        records
    }
}

/// Reads and writes the server list file.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Manager for the default location under the home directory.
    pub fn new() -> Result<Self, ConfigError> {
        Self::default_path().map(Self::with_path)
    }

    /// Manager for an explicit file path.
    pub fn with_path(credentials_path: PathBuf) -> Self {
        Self { credentials_path }
    }

    /// `~/.theme-finder/cred.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Load the server list.
    ///
    /// A missing file is an empty list. A file that is not valid JSON in
    /// either shape is an error; nothing is guessed.
    pub fn load(&self) -> Result<Vec<ServerRecord>, StoreError> {
        if !self.credentials_path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.credentials_path).map_err(|source| StoreError::Io {
            path: self.credentials_path.clone(),
            source,
        })?;

        let stored: StoredServers =
            serde_json::from_str(&json).map_err(|source| StoreError::Malformed {
                path: self.credentials_path.clone(),
                source,
            })?;

        Ok(stored.into_records())
    }

    /// Overwrite the file with `records`.
    ///
    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash mid-write never leaves a truncated list behind. Creates the
    /// parent directory if it doesn't exist.
    pub fn save(&self, records: &[ServerRecord]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.credentials_path.clone(),
            source,
        };

        if let Some(parent) = self.credentials_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;

        let tmp_path = self.credentials_path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
            file.write_all(&json).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp_path, &self.credentials_path).map_err(io_err)?;

        debug!(
            "Saved {} server entries to {:?}",
            records.len(),
            self.credentials_path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Helper to create a CredentialsManager inside a temp dir
    fn create_test_manager(temp_dir: &TempDir) -> CredentialsManager {
        let credentials_path = temp_dir.path().join(CREDENTIALS_DIR).join(CREDENTIALS_FILE);
        CredentialsManager { credentials_path }
    }

    fn record(uuid: &str, address: &str) -> ServerRecord {
        ServerRecord {
            uuid: uuid.to_string(),
            address: address.to_string(),
            username: "alice".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_nonexistent_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        assert!(manager.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let records = vec![
            record("u-1", "http://a.local:8096"),
            record("u-2", "https://b.example"),
        ];
        manager.save(&records).unwrap();

        assert_eq!(manager.load().unwrap(), records);
        assert!(!manager.credentials_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        assert!(!manager.credentials_path.parent().unwrap().exists());

        manager.save(&[]).unwrap();
        assert!(manager.credentials_path.exists());
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        manager
            .save(&[record("u-1", "http://a"), record("u-2", "http://b")])
            .unwrap();
        manager.save(&[record("u-2", "http://b")]).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].uuid, "u-2");
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        fs::create_dir_all(manager.credentials_path.parent().unwrap()).unwrap();
        fs::write(&manager.credentials_path, "not valid json").unwrap();

        assert!(matches!(manager.load(), Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_load_legacy_shape_migrates() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        fs::create_dir_all(manager.credentials_path.parent().unwrap()).unwrap();
        fs::write(
            &manager.credentials_path,
            r#"{"Servers": [
                {"address": "http://a.local:8096", "Id": "srv-a", "AccessToken": "t1", "UserId": "u"},
                {"address": "http://b.local:8096", "Id": "srv-b", "AccessToken": "t2", "UserId": "u"},
                {"address": "http://a.local:8096", "Id": "srv-a", "AccessToken": "t3", "UserId": "v"}
            ]}"#,
        )
        .unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.len(), 3);

        let uuids: HashSet<_> = loaded.iter().map(|r| r.uuid.clone()).collect();
        assert_eq!(uuids.len(), 3);
        assert!(loaded.iter().all(|r| !r.uuid.is_empty()));
        assert!(loaded.iter().all(|r| r.username.is_empty()));
        assert_eq!(loaded[1].access_token.as_deref(), Some("t2"));
    }

    #[test]
    fn test_legacy_usernames_are_cleared() {
        let stored: StoredServers = serde_json::from_str(
            r#"{"Servers": [{"address": "http://a", "username": "old", "uuid": "keep-me"}]}"#,
        )
        .unwrap();
        let records = stored.into_records();
        assert_eq!(records[0].username, "");
        assert_ne!(records[0].uuid, "keep-me");
    }

    #[test]
    fn test_duplicate_uuids_are_reassigned() {
        let stored: StoredServers = serde_json::from_str(
            r#"[{"uuid": "same", "address": "http://a"}, {"uuid": "same", "address": "http://b"}]"#,
        )
        .unwrap();
        let records = stored.into_records();
        assert_eq!(records[0].uuid, "same");
        assert_ne!(records[1].uuid, "same");
    }

    #[test]
    fn test_legacy_shape_never_written_back() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        fs::create_dir_all(manager.credentials_path.parent().unwrap()).unwrap();
        fs::write(
            &manager.credentials_path,
            r#"{"Servers": [{"address": "http://a.local:8096"}]}"#,
        )
        .unwrap();

        let loaded = manager.load().unwrap();
        manager.save(&loaded).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manager.credentials_path).unwrap())
                .unwrap();
        assert!(raw.is_array());
    }
}
