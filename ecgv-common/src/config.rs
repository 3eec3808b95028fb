//! Bootstrap configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (applied by the binary after loading)
//! 2. Config file named by `--config` or the `ECGV_CONFIG` environment variable
//! 3. Platform config file (`~/.config/ecgview/config.toml`, `/etc/ecgview/config.toml`)
//! 4. Compiled defaults
//!
//! A missing platform config file is not an error: the service starts with
//! compiled defaults. A file that was asked for explicitly must exist.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ECGV_CONFIG";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
pub const DEFAULT_DPI: f32 = 300.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Upper bound for the raster resolution; the clinical sheet at this
/// resolution is already well over 100 megapixels.
pub const MAX_DPI: f32 = 600.0;

/// Page layout used when rendering an exam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// One full-width panel per lead, stacked vertically
    Stacked,
    /// 4x3 lead grid plus a rhythm strip
    #[default]
    Clinical,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Stacked => "stacked",
            LayoutKind::Clinical => "clinical",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stacked" => Ok(LayoutKind::Stacked),
            "clinical" => Ok(LayoutKind::Clinical),
            other => Err(Error::Config(format!(
                "Unknown layout '{}' (expected 'stacked' or 'clinical')",
                other
            ))),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every section and key is optional; anything left out takes its
/// compiled default.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP server port
    ///
    /// Default: 5780
    pub port: u16,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Raster resolution in dots per inch
    pub dpi: f32,

    /// Layout used when a request does not ask for one
    pub default_layout: LayoutKind,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            default_layout: LayoutKind::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file on disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        if !(self.render.dpi > 0.0 && self.render.dpi <= MAX_DPI) {
            return Err(Error::Config(format!(
                "render.dpi must be in (0, {}], got {}",
                MAX_DPI, self.render.dpi
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::Config("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit path from the command line or `ECGV_CONFIG`
    Explicit(PathBuf),
    /// Platform config file found on disk
    Platform(PathBuf),
    /// No file; compiled defaults
    Defaults,
}

/// Resolve which config file to read
///
/// `cli_arg` beats the environment variable, which beats the platform
/// locations. Returns `ConfigSource::Defaults` when no platform file exists.
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    for candidate in platform_config_paths() {
        if candidate.exists() {
            return ConfigSource::Platform(candidate);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::Defaults
}

/// Candidate platform config files, in lookup order
pub fn platform_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ecgview").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/ecgview/config.toml"));
    }
    paths
}

/// Resolve and load the bootstrap configuration
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let source = resolve_config_source(cli_arg);
    let config = match &source {
        ConfigSource::Explicit(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = TomlConfig::from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        ConfigSource::Platform(path) => {
            let config = TomlConfig::from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        ConfigSource::Defaults => {
            warn!("No configuration file found, using compiled defaults");
            TomlConfig::default()
        }
    };
    Ok((config, source))
}
