//! Configuration management for emulog
//!
//! The application configuration lives in `~/.emulog/config.toml`. Channel
//! settings are kept in a flat `[channels]` key-value section that the log
//! manager reads and writes through [`ConfigSection`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LogError;

/// Default number of records kept by the ring-buffer sink
pub const DEFAULT_RING_CAPACITY: usize = 1024;

/// A flat key-value settings section
///
/// Values are stored as TOML values so the section serializes as a plain
/// table. Typed getters fall back to the supplied default when a key is
/// missing or holds the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSection {
    values: toml::Table,
}

impl ConfigSection {
    /// Create an empty section
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a boolean value
    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), toml::Value::Boolean(value));
    }

    /// Store an integer value
    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), toml::Value::Integer(value));
    }

    /// Read a boolean, returning `None` if the key is absent
    pub fn try_bool(&self, key: &str) -> Option<std::result::Result<bool, LogError>> {
        self.values.get(key).map(|v| {
            v.as_bool().ok_or_else(|| LogError::InvalidSetting {
                key: key.to_string(),
            })
        })
    }

    /// Read an integer, returning `None` if the key is absent
    pub fn try_int(&self, key: &str) -> Option<std::result::Result<i64, LogError>> {
        self.values.get(key).map(|v| {
            v.as_integer().ok_or_else(|| LogError::InvalidSetting {
                key: key.to_string(),
            })
        })
    }

    /// Read a boolean with a fallback for missing or malformed values
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.try_bool(key) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                tracing::warn!("{}, using default {}", e, default);
                default
            }
            None => default,
        }
    }

    /// Read an integer with a fallback for missing or malformed values
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.try_int(key) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                tracing::warn!("{}, using default {}", e, default);
                default
            }
            None => default,
        }
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the section has no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Process-wide logging switch. When false nothing is formatted or dispatched.
    #[serde(default = "default_true")]
    pub enable_logging: bool,

    /// File sink target. An empty path disables the file sink.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Slots in the in-memory scrollback
    #[serde(default = "default_ring_capacity")]
    pub ring_capacity: usize,

    /// Attach the terminal sink
    #[serde(default = "default_true")]
    pub console: bool,

    /// Attach the debugger sink when a debugger is present. Slow, off by default.
    #[serde(default)]
    pub debugger_output: bool,

    /// Use verbose thresholds for channels without stored settings
    #[serde(default = "default_debug_defaults")]
    pub debug_defaults: bool,

    /// Per-channel `<NAME>Enabled` / `<NAME>Level` settings
    #[serde(default)]
    pub channels: ConfigSection,
}

fn default_true() -> bool {
    true
}

fn default_log_file() -> PathBuf {
    logs_dir().join("emulog.log")
}

fn default_ring_capacity() -> usize {
    DEFAULT_RING_CAPACITY
}

fn default_debug_defaults() -> bool {
    cfg!(debug_assertions)
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            log_file: default_log_file(),
            ring_capacity: default_ring_capacity(),
            console: true,
            debugger_output: false,
            debug_defaults: default_debug_defaults(),
            channels: ConfigSection::new(),
        }
    }
}

impl LogConfig {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }
}

/// Get the base configuration directory (~/.emulog)
/// Falls back to ./.emulog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".emulog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".emulog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all required directories exist
pub fn ensure_directories() -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;
    Ok(())
}
