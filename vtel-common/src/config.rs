//! Bootstrap configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! Tiers 1 and 2 are handled by the service's argument parser; this module
//! owns the TOML file and the defaults. A missing TOML file is not an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "vehicle_db.db";
/// Default directory scanned for per-vehicle CSV files
pub const DEFAULT_DATA_PATH: &str = "vehicle/data";
/// Default directory receiving export files
pub const DEFAULT_EXPORTS_PATH: &str = "exports";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; absent fields fall back to the
/// compiled defaults above.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory holding one CSV file per vehicle
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Directory where export files are written
    #[serde(default = "default_exports_path")]
    pub exports_path: PathBuf,

    /// HTTP bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            data_path: default_data_path(),
            exports_path: default_exports_path(),
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
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

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_exports_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORTS_PATH)
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location for a module, e.g. `~/.config/vtel/vtel-vd.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vtel").join(format!("{}.toml", module_name)))
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load TOML configuration from `path`.
///
/// Returns `Ok(None)` when the file does not exist so the caller can warn
/// and continue with defaults. A file that exists but cannot be read or
/// parsed is an error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content).map(Some)
}
