//! Aggregator configuration
//!
//! Read from YAML. Lookup order: an explicit path, the `COTAG_CONFIG`
//! environment variable, then `<config_dir>/cotag/config.yaml`. A missing
//! file at an implicit location yields the defaults.

use crate::relation::{DEFAULT_MAX_RELATED, DEFAULT_MAX_RETRIES};
use crate::render::DEFAULT_LINK_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "COTAG_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cap on retained related tags per record
    #[serde(default = "default_max_related")]
    pub max_related: usize,
    /// Read-merge-write attempts per tag under contention
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fragment template; see `TemplateRenderer`
    #[serde(default = "default_link_template")]
    pub link_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_related: default_max_related(),
            max_retries: default_max_retries(),
            link_template: default_link_template(),
        }
    }
}

fn default_max_related() -> usize {
    DEFAULT_MAX_RELATED
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_link_template() -> String {
    DEFAULT_LINK_TEMPLATE.to_string()
}

impl Config {
    /// Load from `path`, or from the implicit locations when `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match resolve_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_related == 0 {
            return Err(ConfigError::Invalid("max_related must be at least 1".to_string()));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|base| base.join("cotag").join("config.yaml"))
}
