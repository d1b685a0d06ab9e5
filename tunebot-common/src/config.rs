//! Configuration loading and data directory resolution
//!
//! Bootstrap settings come from a TOML file. Every key is optional and
//! falls back to a compiled default. A missing file at the default
//! location is not an error: the service logs a warning and starts with
//! defaults.
//!
//! Data directory priority:
//! 1. Command-line argument or environment variable (resolved by the binary)
//! 2. `data_dir` in the TOML file
//! 3. OS-dependent compiled default

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cover::validate_cover_size;
use crate::quality::QualityTier;
use crate::{Error, Result};

/// File name of the persisted credential inside the data directory
pub const CREDENTIAL_FILE_NAME: &str = "qqmusic_cred.json";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding the persisted credential
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Album cover size in pixels; 0 disables covers
    #[serde(default = "default_cover_size")]
    pub cover_size: u32,

    /// Quality tried first when resolving a playable URL
    #[serde(default)]
    pub preferred_quality: QualityTier,

    /// Chat transport endpoint
    #[serde(default)]
    pub onebot: OneBotConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OneBot v11 HTTP API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneBotConfig {
    #[serde(default = "default_onebot_url")]
    pub api_url: String,

    /// Bearer token, sent only when non-empty
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    8021
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_cover_size() -> u32 {
    500
}

fn default_onebot_url() -> String {
    "http://127.0.0.1:5700".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            data_dir: None,
            cover_size: default_cover_size(),
            preferred_quality: QualityTier::default(),
            onebot: OneBotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            api_url: default_onebot_url(),
            access_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would otherwise surface only at request time
    pub fn validate(&self) -> Result<()> {
        validate_cover_size(self.cover_size)
            .map_err(|e| Error::Config(format!("cover_size: {}", e)))?;
        if self.onebot.api_url.trim().is_empty() {
            return Err(Error::Config("onebot.api_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from an explicit path or the default location
///
/// An explicit path must exist. The default location may be absent, in
/// which case compiled defaults are used.
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let (path, explicit) = match explicit_path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!("Config file not found: {}", path.display())));
        }
        warn!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = TomlConfig::from_toml_str(&content)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// `<config_dir>/tunebot/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunebot").join("config.toml"))
}

/// Resolve the data directory by priority
pub fn resolve_data_dir(override_dir: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = override_dir {
        return path.to_path_buf();
    }
    if let Some(path) = &config.data_dir {
        return path.clone();
    }
    default_data_dir()
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunebot"))
        .unwrap_or_else(|| PathBuf::from("./tunebot_data"))
}

/// Create the data directory if missing
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created data directory: {}", path.display());
    }
    Ok(())
}
