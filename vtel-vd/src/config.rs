//! Service configuration for vtel-vd
//!
//! Command-line flags (and their `VTEL_*` environment fallbacks, handled by
//! clap) override the TOML file, which overrides compiled defaults.

use std::path::PathBuf;

use clap::Parser;
use vtel_common::config::{default_config_path, TomlConfig};

/// Module name used for the default config file location
pub const MODULE_NAME: &str = "vtel-vd";

/// Command-line arguments for vtel-vd
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vtel-vd")]
#[command(about = "Vehicle telemetry data service")]
#[command(version)]
pub struct CliArgs {
    /// TOML config file (default: platform config dir, vtel/vtel-vd.toml)
    #[arg(short, long, env = "VTEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "VTEL_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory holding one CSV file per vehicle
    #[arg(long, env = "VTEL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory receiving export files
    #[arg(long, env = "VTEL_EXPORTS_DIR")]
    pub exports_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "VTEL_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VTEL_PORT")]
    pub port: Option<u16>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "VTEL_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Config file to load: the explicit one, else the platform default
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| default_config_path(MODULE_NAME))
    }
}

/// Fully resolved settings for one server run
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub data_path: PathBuf,
    pub exports_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge arguments over the file settings
    pub fn resolve(args: &CliArgs, file: TomlConfig) -> Self {
        Self {
            database_path: args.database.clone().unwrap_or(file.database_path),
            data_path: args.data_dir.clone().unwrap_or(file.data_path),
            exports_path: args.exports_dir.clone().unwrap_or(file.exports_path),
            host: args.host.clone().unwrap_or(file.host),
            port: args.port.unwrap_or(file.port),
            log_level: args.log_level.clone().unwrap_or(file.logging.level),
        }
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
