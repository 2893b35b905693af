//! Catalog configuration file handling
//!
//! Loads ~/.config/creature-catalog/config.yaml. Every section has defaults,
//! so a missing file or a partial file is fine.

use crate::storage::StoreConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn config_dir() -> PathBuf {
    // Always use ~/.config for consistency across platforms (macOS, Linux)
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("creature-catalog");
    path
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Record store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

fn default_db_path() -> PathBuf {
    config_dir().join("catalog.db")
}

fn default_true() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            wal_mode: true,
        }
    }
}

impl StorageSettings {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.path.clone(),
            wal_mode: self.wal_mode,
        }
    }
}

/// Which cache client to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Sqlite,
    Redis,
}

/// Cache client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub backend: CacheBackendKind,

    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// SQLite cache file (sqlite backend only)
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Entry lifetime; unset means entries live until invalidated
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Per-call timeout for the redis backend
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_cache_path() -> PathBuf {
    config_dir().join("cache.db")
}

fn default_cache_timeout_ms() -> u64 {
    250
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            redis_url: default_redis_url(),
            path: default_cache_path(),
            ttl_secs: None,
            timeout_ms: default_cache_timeout_ms(),
        }
    }
}

/// Ingestion source and pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of summaries fetched per seed
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout against the source
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_page_size() -> u32 {
    30
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            seed_on_startup: true,
        }
    }
}

impl IngestSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub ingest: IngestSettings,
}

impl CatalogConfig {
    /// Load from `path`, or the default path when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied either way.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)?
                } else {
                    tracing::info!(path = %default.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::CatalogError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading catalog configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            port = config.server.port,
            cache = ?config.cache.backend,
            page_size = config.ingest.page_size,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/creature-catalog/config.yaml)
    pub fn default_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// Apply deployment overrides. `REDIS_URL` also switches the cache to redis.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("REDIS_URL") {
            self.cache.backend = CacheBackendKind::Redis;
            self.cache.redis_url = url;
        }
        if let Some(path) = lookup("CATALOG_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(port) = lookup("CATALOG_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid CATALOG_PORT"),
            }
        }
        if let Some(base_url) = lookup("POKEAPI_BASE_URL") {
            self.ingest.base_url = base_url;
        }
    }
}
