//! Runtime configuration.
//!
//! Values come from defaults, then environment variables, then explicit
//! `with_*` overrides. Invalid environment values are rejected rather than
//! clamped.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::CredentialsManager;
use crate::error::ConfigError;
use crate::session::DEFAULT_MAX_BACKOFF_SECS;

/// Skip TLS certificate validation for HTTP and WebSocket.
pub const ENV_IGNORE_SSL: &str = "THEME_FINDER_IGNORE_SSL";
/// Minutes to keep retrying the startup connect.
pub const ENV_CONNECT_RETRY_MINS: &str = "THEME_FINDER_CONNECT_RETRY_MINS";
/// Cap on the reconnect backoff, in seconds.
pub const ENV_MAX_BACKOFF_SECS: &str = "THEME_FINDER_MAX_BACKOFF_SECS";
/// Override for the credentials file location.
pub const ENV_CREDENTIALS: &str = "THEME_FINDER_CREDENTIALS";
/// Seconds to wait between theme downloads.
pub const ENV_PAUSE_SECS: &str = "THEME_FINDER_PAUSE_SECS";

/// Configuration of the client manager.
///
/// # Example
///
/// ```ignore
/// use themefinder::startup::ManagerConfig;
///
/// let config = ManagerConfig::from_env()?
///     .with_ignore_ssl_cert(true)
///     .with_connect_retry_mins(5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Skip TLS certificate validation (default: false)
    pub ignore_ssl_cert: bool,
    /// Startup connect-retry window in minutes, 0 disables it (default: 0)
    pub connect_retry_mins: u64,
    /// Cap on the reconnect delay in seconds (default: 100)
    pub max_backoff_secs: u64,
    /// Location of the server list (default: ~/.theme-finder/cred.json)
    pub credentials_path: PathBuf,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            ignore_ssl_cert: false,
            connect_retry_mins: 0,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
            credentials_path: CredentialsManager::default_path()
                .unwrap_or_else(|_| PathBuf::from("cred.json")),
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_ssl_cert(mut self, ignore: bool) -> Self {
        self.ignore_ssl_cert = ignore;
        self
    }

    pub fn with_connect_retry_mins(mut self, mins: u64) -> Self {
        self.connect_retry_mins = mins;
        self
    }

    /// Caps below one second behave as one second.
    pub fn with_max_backoff_secs(mut self, secs: u64) -> Self {
        self.max_backoff_secs = secs;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Build from the `THEME_FINDER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = env_var(ENV_IGNORE_SSL) {
            config.ignore_ssl_cert = parse_bool(ENV_IGNORE_SSL, &value)?;
        }
        if let Some(value) = env_var(ENV_CONNECT_RETRY_MINS) {
            config.connect_retry_mins = parse_u64(ENV_CONNECT_RETRY_MINS, &value)?;
        }
        if let Some(value) = env_var(ENV_MAX_BACKOFF_SECS) {
            config.max_backoff_secs = parse_positive_u64(ENV_MAX_BACKOFF_SECS, &value)?;
        }
        match env_var(ENV_CREDENTIALS) {
            Some(path) => config.credentials_path = PathBuf::from(path),
            None => config.credentials_path = CredentialsManager::default_path()?,
        }
        Ok(config)
    }
}

/// Pause between two theme downloads, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseBetweenDownloads(u64);

impl PauseBetweenDownloads {
    pub fn new(secs: i64) -> Result<Self, ConfigError> {
        u64::try_from(secs)
            .map(Self)
            .map_err(|_| ConfigError::InvalidPause(secs.to_string()))
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }

    pub fn secs(&self) -> u64 {
        self.0
    }
}

/// Configuration of the theme download batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadConfig {
    pub pause_between_downloads: PauseBetweenDownloads,
}

impl DownloadConfig {
    pub fn with_pause(mut self, pause: PauseBetweenDownloads) -> Self {
        self.pause_between_downloads = pause;
        self
    }

    /// Build from `THEME_FINDER_PAUSE_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = env_var(ENV_PAUSE_SECS) {
            let secs = value
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidPause(value.clone()))?;
            config.pause_between_downloads = PauseBetweenDownloads::new(secs)?;
        }
        Ok(config)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_positive_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    match parse_u64(key, value) {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a positive integer",
        }),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            ENV_IGNORE_SSL,
            ENV_CONNECT_RETRY_MINS,
            ENV_MAX_BACKOFF_SECS,
            ENV_CREDENTIALS,
            ENV_PAUSE_SECS,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_manager_config_default() {
        let config = ManagerConfig::default();
        assert!(!config.ignore_ssl_cert);
        assert_eq!(config.connect_retry_mins, 0);
        assert_eq!(config.max_backoff_secs, 100);
        assert!(config.credentials_path.ends_with("cred.json"));
    }

    #[test]
    fn test_manager_config_builder() {
        let config = ManagerConfig::new()
            .with_ignore_ssl_cert(true)
            .with_connect_retry_mins(3)
            .with_max_backoff_secs(8)
            .with_credentials_path("/tmp/servers.json");
        assert!(config.ignore_ssl_cert);
        assert_eq!(config.connect_retry_mins, 3);
        assert_eq!(config.max_backoff_secs, 8);
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/servers.json"));
    }

    #[test]
    #[serial]
    fn test_manager_config_from_env() {
        clear_env();
        std::env::set_var(ENV_IGNORE_SSL, "true");
        std::env::set_var(ENV_CONNECT_RETRY_MINS, "2");
        std::env::set_var(ENV_CREDENTIALS, "/tmp/other.json");

        let config = ManagerConfig::from_env().unwrap();
        assert!(config.ignore_ssl_cert);
        assert_eq!(config.connect_retry_mins, 2);
        assert_eq!(config.max_backoff_secs, 100);
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/other.json"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_manager_config_rejects_bad_values() {
        clear_env();
        std::env::set_var(ENV_IGNORE_SSL, "maybe");
        let err = ManagerConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { expected: "a boolean", .. }));

        clear_env();
        std::env::set_var(ENV_MAX_BACKOFF_SECS, "-5");
        assert!(ManagerConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_manager_config_rejects_zero_backoff_cap() {
        clear_env();
        std::env::set_var(ENV_MAX_BACKOFF_SECS, "0");
        let err = ManagerConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_MAX_BACKOFF_SECS.to_string(),
                value: "0".to_string(),
                expected: "a positive integer",
            }
        );

        std::env::set_var(ENV_MAX_BACKOFF_SECS, "1");
        assert_eq!(ManagerConfig::from_env().unwrap().max_backoff_secs, 1);
        clear_env();
    }

    #[test]
    fn test_pause_validation() {
        assert_eq!(PauseBetweenDownloads::new(0).unwrap().secs(), 0);
        assert_eq!(
            PauseBetweenDownloads::new(7).unwrap().as_duration(),
            Duration::from_secs(7)
        );
        assert_eq!(
            PauseBetweenDownloads::new(-1),
            Err(ConfigError::InvalidPause("-1".to_string()))
        );
    }

    #[test]
    #[serial]
    fn test_download_config_from_env() {
        clear_env();
        assert_eq!(DownloadConfig::from_env().unwrap(), DownloadConfig::default());

        std::env::set_var(ENV_PAUSE_SECS, "4");
        let config = DownloadConfig::from_env().unwrap();
        assert_eq!(config.pause_between_downloads.secs(), 4);

        std::env::set_var(ENV_PAUSE_SECS, "1.5");
        assert_eq!(
            DownloadConfig::from_env(),
            Err(ConfigError::InvalidPause("1.5".to_string()))
        );

        std::env::set_var(ENV_PAUSE_SECS, "-3");
        assert_eq!(
            DownloadConfig::from_env(),
            Err(ConfigError::InvalidPause("-3".to_string()))
        );
        clear_env();
    }
}
