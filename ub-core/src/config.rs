//! Application configuration management.
//!
//! Handles loading, saving, and accessing application configuration: the
//! backend URL, identity provider credentials, local storage, logging and
//! live-sync tuning. Configuration is persisted as TOML on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{UbError, UbResult};
use crate::platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST backend settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity provider settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Live message synchronization settings.
    #[serde(default)]
    pub live: LiveConfig,

    /// Station directory settings.
    #[serde(default)]
    pub stations: StationsConfig,
}

/// REST backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backend base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds. `None` keeps the HTTP client's defaults.
    #[serde(default)]
    pub api_timeout_ms: Option<u64>,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

/// Identity provider configuration (Firebase Auth REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Web API key of the identity project.
    #[serde(default)]
    pub api_key: String,

    /// REST endpoint root.
    #[serde(default = "default_auth_endpoint")]
    pub endpoint: String,
}

/// Local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite preferences file. If empty, uses default location.
    #[serde(default)]
    pub path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Run integrity check on startup.
    #[serde(default = "default_true")]
    pub integrity_check_on_startup: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// Live message synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Poll interval of the REST-backed snapshot source.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Buffer size of the application event bus.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Station directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// Search radius sent with every station query.
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,
}

// Default value functions for serde

fn default_base_url() -> String {
    constants::DEFAULT_BASE_URL.to_string()
}

fn default_auth_endpoint() -> String {
    constants::DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_MS
}

fn default_channel_capacity() -> usize {
    constants::DEFAULT_CHANNEL_CAPACITY
}

fn default_search_radius() -> u32 {
    constants::STATION_SEARCH_RADIUS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_timeout_ms: None,
            custom_headers: HashMap::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_auth_endpoint(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
            integrity_check_on_startup: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> UbResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> UbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.server.base_url = Self::sanitize_base_url(&config.server.base_url);
        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save_default(&self) -> UbResult<()> {
        let path = Self::default_config_path()?;
        self.save_to_file(&path)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> UbResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| UbError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> UbResult<PathBuf> {
        Ok(platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective preferences database path.
    pub fn effective_db_path(&self) -> UbResult<PathBuf> {
        if self.storage.path.is_empty() {
            Ok(platform::data_dir()?.join("ubicasure.db"))
        } else {
            Ok(PathBuf::from(&self.storage.path))
        }
    }

    /// Get the effective log directory.
    pub fn effective_log_dir(&self) -> UbResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Whether the identity provider can be reached.
    pub fn is_auth_configured(&self) -> bool {
        !self.auth.api_key.is_empty()
    }

    /// Normalize a backend address: trim quotes and whitespace, add a scheme
    /// when missing and strip trailing slashes.
    pub fn sanitize_base_url(address: &str) -> String {
        let trimmed = address.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.starts_with("localhost") || trimmed.starts_with("127.") {
            format!("http://{trimmed}")
        } else {
            format!("https://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Clone the current configuration out of the lock.
    pub async fn snapshot(&self) -> AppConfig {
        self.inner.read().await.clone()
    }

    /// Save the current configuration to disk.
    pub async fn save(&self) -> UbResult<()> {
        let config = self.inner.read().await;
        config.save_default()
    }
}
