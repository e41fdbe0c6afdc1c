//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Priority;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Upper bound for the artificial add delay
const MAX_SUBMIT_DELAY_MS: u64 = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage record names and locking
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Record holding the task collection
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,

    /// Record holding the dark-mode flag
    #[serde(default = "default_theme_key")]
    pub theme_key: String,

    /// How long a write waits for the record lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_tasks_key() -> String {
    "enhancedTodoTasks".to_string()
}

fn default_theme_key() -> String {
    "darkMode".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_key: default_tasks_key(),
            theme_key: default_theme_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Task-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority used when `add` is not given one
    #[serde(default)]
    pub default_priority: Priority,

    /// Artificial latency of `add`, during which the manager reports busy
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
}

fn default_submit_delay_ms() -> u64 {
    300
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::default(),
            submit_delay_ms: default_submit_delay_ms(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export files are named `<prefix>-YYYY-MM-DD.json`
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "enhanced-todos".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
        }
    }
}

fn validate_name(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(Error::InvalidConfig(format!(
            "{field} '{value}' must only contain [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
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

    fn validate(&self) -> Result<()> {
        validate_name(&self.storage.tasks_key, "storage.tasks_key")?;
        validate_name(&self.storage.theme_key, "storage.theme_key")?;
        if self.storage.tasks_key == self.storage.theme_key {
            return Err(Error::InvalidConfig(
                "storage.tasks_key and storage.theme_key must differ".to_string(),
            ));
        }
        if self.tasks.submit_delay_ms > MAX_SUBMIT_DELAY_MS {
            return Err(Error::InvalidConfig(format!(
                "tasks.submit_delay_ms must be <= {MAX_SUBMIT_DELAY_MS}"
            )));
        }
        validate_name(&self.export.file_prefix, "export.file_prefix")?;
        Ok(())
    }
}
