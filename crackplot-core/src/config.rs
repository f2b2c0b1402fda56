//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/crackplot/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/crackplot/` (~/.config/crackplot/)
//! - State/Logs: `$XDG_STATE_HOME/crackplot/` (~/.local/state/crackplot/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Refresh loop configuration
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Chart configuration
    #[serde(default)]
    pub chart: ChartConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Refresh loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Seconds between polls of the input files (1-300)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Seconds between producer samples (hashcat --status-timer)
    #[serde(default = "default_status_timer_secs")]
    pub status_timer_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            status_timer_secs: default_status_timer_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_status_timer_secs() -> u64 {
    1
}

/// Chart configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    /// Per-series point budget before downsampling kicks in
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Overlay potfile phases in a contrasting color
    #[serde(default = "default_potfile_highlight")]
    pub potfile_highlight: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
            potfile_highlight: default_potfile_highlight(),
        }
    }
}

fn default_max_points() -> usize {
    1000
}

fn default_potfile_highlight() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.refresh.interval_secs < 1 || self.refresh.interval_secs > 300 {
            return Err(Error::Config(
                "refresh.interval_secs must be between 1 and 300".to_string(),
            ));
        }
        if self.refresh.status_timer_secs < 1 {
            return Err(Error::Config(
                "refresh.status_timer_secs must be at least 1".to_string(),
            ));
        }
        if self.chart.max_points < 2 {
            return Err(Error::Config(
                "chart.max_points must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/crackplot/config.toml` (~/.config/crackplot/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("crackplot").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/crackplot/` (~/.local/state/crackplot/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("crackplot")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/crackplot/crackplot.log` (~/.local/state/crackplot/crackplot.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("crackplot.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
