//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/withdrawal-tracker/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::MedicineStandard;
use crate::resolver::DEFAULT_SUGGESTION_THRESHOLD;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Database location
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Catalog seeding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Seed the standard catalog when the catalog table is empty
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,

    /// Entries upserted on every open
    #[serde(default)]
    pub extra: Vec<MedicineStandard>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_defaults: default_seed_defaults(),
            extra: Vec::new(),
        }
    }
}

/// Medicine resolution tuning
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Minimum similarity (0.0 to 1.0) for "did you mean" suggestions
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

// Default value functions
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("withdrawal-tracker")
        .join("tracker.db")
}

fn default_seed_defaults() -> bool {
    true
}

fn default_suggestion_threshold() -> f64 {
    DEFAULT_SUGGESTION_THRESHOLD
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("withdrawal-tracker")
            .join("config.toml")
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the tracker cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.resolver.suggestion_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "resolver.suggestion_threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        if let Some(unnamed) = self.catalog.extra.iter().find(|m| m.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "catalog.extra entry with {} withdrawal days has no name",
                unnamed.withdrawal_days
            )));
        }
        Ok(())
    }
}
