//! Configuration for the seeder, read from a TOML file

use sensorlog_core::IngestMode;
use sensorlog_store::database::DEFAULT_DATABASE_URI;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "sensorlog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

// Main config structure
#[derive(Debug, Deserialize, PartialEq)]
pub struct AppConfig {
    // sqlalchemy-style sqlite uri, DATABASE_URI wins over this
    #[serde(default = "default_database_uri")]
    pub database_uri: String,

    // where equipment.json, equipment_sensors.csv and the log file live
    #[serde(default = "default_resource_dir")]
    pub resource_dir: PathBuf,

    #[serde(default)]
    pub ingest: IngestSettings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct IngestSettings {
    // bulk (all-or-nothing) or tolerant (skip and report)
    #[serde(default)]
    pub mode: IngestMode,

    #[serde(default)]
    pub parallel_parse: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_uri: default_database_uri(),
            resource_dir: default_resource_dir(),
            ingest: IngestSettings::default(),
        }
    }
}

fn default_database_uri() -> String {
    DEFAULT_DATABASE_URI.to_string()
}

fn default_resource_dir() -> PathBuf {
    PathBuf::from("resource")
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Explicit path must exist; without one, `sensorlog.toml` is used when present.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => Ok(AppConfig::default()),
    }
}
