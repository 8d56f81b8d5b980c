// Configuration module for the UdaciRacer client

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::constants::{
    COUNTDOWN_LEAD_IN, COUNTDOWN_SECONDS, COUNTDOWN_TICK, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SERVER_URL, MIN_TIMER_PERIOD, POLL_INTERVAL,
};
use crate::core::lifecycle::LifecycleTiming;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Race server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URL of the race server
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Race lifecycle timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSettings {
    /// Countdown length in seconds
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
    /// Delay before the countdown starts, in milliseconds
    #[serde(default = "default_lead_in_ms")]
    pub lead_in_ms: u64,
    /// Race status polling cadence in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_countdown_seconds() -> u32 {
    COUNTDOWN_SECONDS
}
fn default_lead_in_ms() -> u64 {
    COUNTDOWN_LEAD_IN.as_millis() as u64
}
fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL.as_millis() as u64
}

impl RaceSettings {
    pub fn timing(&self) -> LifecycleTiming {
        LifecycleTiming {
            lead_in: Duration::from_millis(self.lead_in_ms),
            countdown_seconds: self.countdown_seconds,
            countdown_tick: COUNTDOWN_TICK,
            poll_interval: Duration::from_millis(self.poll_interval_ms).max(MIN_TIMER_PERIOD),
        }
    }
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: default_countdown_seconds(),
            lead_in_ms: default_lead_in_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Write logs to stderr
    #[serde(default)]
    pub console: bool,
    /// Log file path (relative to the working directory or absolute). Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
    /// Level for the client's own targets
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            console: false,
            log_file: String::new(),
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    pub fn log_file_path(&self) -> Option<PathBuf> {
        if self.log_file.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.log_file))
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub race: RaceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    pub const CONFIG_FILENAME: &'static str = "udaciracer.toml";

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "[config] Looking for config");

        if !path.exists() {
            debug!("[config] No config found, using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "[config] Loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
