//! TOML-based configuration persistence for rack-audit.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\RackAudit\config.toml`
//! - Linux:    `~/.config/rackaudit/config.toml`
//! - macOS:    `~/Library/Application Support/RackAudit/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [audit]
//! default_rack_height = 42
//! log_level = "info"
//!
//! [display]
//! show_empty_units = true
//! label_width = 28
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "some_fn")]`, and both sections are
//! `#[serde(default)]`, so an empty file, a file from an older release, or no
//! file at all yields a working configuration.

use std::path::{Path, PathBuf};

use rack_core::DEFAULT_RACK_HEIGHT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Rack defaults and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
    /// Height used by `rack-audit new` when `--height` is not given.
    #[serde(default = "default_rack_height")]
    pub default_rack_height: u32,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Text elevation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Print a line for every empty unit instead of collapsing empty runs.
    #[serde(default = "default_true")]
    pub show_empty_units: bool,
    /// Width of the device label column, in characters.
    #[serde(default = "default_label_width")]
    pub label_width: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_rack_height() -> u32 {
    DEFAULT_RACK_HEIGHT
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_label_width() -> usize {
    28
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_rack_height: default_rack_height(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_empty_units: default_true(),
            label_width: default_label_width(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            debug!("loaded config from {}", path.display());
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config at {}, using defaults", path.display());
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory, including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RackAudit"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("rackaudit"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RackAudit")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
