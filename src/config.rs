//! Configuration loading and management
//!
//! Handles parsing of `taskmaster.toml` from the data directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::storage::validate_key;

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = "taskmaster.toml";

/// Storage key of the task collection blob
pub const DEFAULT_STORAGE_KEY: &str = "taskmaster_tasks";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Blob storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// First-run sample data
    #[serde(default)]
    pub seed: SeedConfig,

    /// Simulated per-operation latency
    #[serde(default)]
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Key the task collection is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// How long to wait for the storage lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedConfig {
    /// Seed sample tasks when the store is empty
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Artificial delays that make loading states observable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatencyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_get_all_ms")]
    pub get_all_ms: u64,

    #[serde(default = "default_get_by_id_ms")]
    pub get_by_id_ms: u64,

    #[serde(default = "default_create_ms")]
    pub create_ms: u64,

    #[serde(default = "default_update_ms")]
    pub update_ms: u64,

    #[serde(default = "default_delete_ms")]
    pub delete_ms: u64,
}

fn default_get_all_ms() -> u64 {
    600
}

fn default_get_by_id_ms() -> u64 {
    400
}

fn default_create_ms() -> u64 {
    800
}

fn default_update_ms() -> u64 {
    600
}

fn default_delete_ms() -> u64 {
    500
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            get_all_ms: default_get_all_ms(),
            get_by_id_ms: default_get_by_id_ms(),
            create_ms: default_create_ms(),
            update_ms: default_update_ms(),
            delete_ms: default_delete_ms(),
        }
    }
}

/// Store operations that can carry simulated latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
}

impl LatencyConfig {
    /// Delay for `op`, zero when latency simulation is off
    pub fn delay_for(&self, op: StoreOp) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let ms = match op {
            StoreOp::GetAll => self.get_all_ms,
            StoreOp::GetById => self.get_by_id_ms,
            StoreOp::Create => self.create_ms,
            StoreOp::Update => self.update_ms,
            StoreOp::Delete => self.delete_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Config {
    /// Load configuration from a `taskmaster.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = Self::path_in(data_dir);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Path of the config file inside `data_dir`
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        validate_key(&self.storage.key).map_err(|err| {
            crate::error::Error::InvalidConfig(format!("storage.key: {err}"))
        })?;
        if self.storage.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default data directory for this user
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "taskmaster").map(|dirs| dirs.data_dir().to_path_buf())
}
