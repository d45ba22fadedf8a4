//! Configuration system for the hub.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $HUB_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/hub/config.toml
//!   3. ~/.config/hub/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Seconds between two statistics samples.
pub const TIMEOUT_STATS: u64 = 60;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub stats: StatsConfig,
    pub sessions: SessionsConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Statistics interval. 0 is treated as 1.
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidPolicy {
    /// Plain increasing counter; identifiers are never reused and run out
    /// after SID_MAX - 1 joins.
    #[default]
    Monotonic,
    /// Wrap at SID_MAX and skip identifiers held by live sessions.
    Reuse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub sid_policy: SidPolicy,
    /// Directory slots reserved up front.
    pub initial_capacity: usize,
    /// Per-session outbound queue depth before sends are rejected.
    pub send_queue_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Pending requests to the hub worker before callers wait.
    pub request_queue: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_secs: TIMEOUT_STATS,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            sid_policy: SidPolicy::Monotonic,
            initial_capacity: 256,
            send_queue_capacity: 1024,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            request_queue: 1024,
        }
    }
}

impl StatsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// `$XDG_CONFIG_HOME/hub`, else `$HOME/.config/hub`.
pub fn config_dir() -> PathBuf {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(std::env::var_os("HOME").unwrap_or_default()).join(".config"),
    };
    base.join("hub")
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl HubConfig {
    /// Load from the default location, then apply HUB_* env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::file_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse `path`, or return defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// `$HUB_CONFIG`, else `config.toml` under [`config_dir`].
    pub fn file_path() -> PathBuf {
        std::env::var_os("HUB_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir().join("config.toml"))
    }

    /// Write the default config to the default location if none exists.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        Self::write_default_to(&path)?;
        Ok(path)
    }

    /// Write the default config to `path` unless something is already there.
    pub fn write_default_to(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text =
            toml::to_string_pretty(&HubConfig::default()).map_err(ConfigError::SerializeFailed)?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))
    }

    /// Apply HUB_* overrides. `lookup` is `std::env::var` outside of tests.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("HUB_STATS__INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.stats.interval_secs = secs;
            }
        }
        if let Some(v) = lookup("HUB_SESSIONS__SID_POLICY") {
            match v.as_str() {
                "monotonic" => self.sessions.sid_policy = SidPolicy::Monotonic,
                "reuse" => self.sessions.sid_policy = SidPolicy::Reuse,
                _ => {}
            }
        }
        if let Some(v) = lookup("HUB_SESSIONS__SEND_QUEUE_CAPACITY") {
            if let Ok(n) = v.parse() {
                self.sessions.send_queue_capacity = n;
            }
        }
        if let Some(v) = lookup("HUB_WORKER__REQUEST_QUEUE") {
            if let Ok(n) = v.parse() {
                self.worker.request_queue = n;
            }
        }
    }
}
