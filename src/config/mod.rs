//! Configuration management for ghm

pub mod repos;
pub mod schema;

pub use repos::{load_repos, select_repos, PrefixPattern};
pub use schema::Config;

use crate::error::{GhmError, GhmResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghm")
            .join("config.toml")
    }

    /// Get the default cache file path
    pub fn default_cache_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghm")
            .join("cache.json")
    }

    /// Get the default repository list path
    pub fn default_repos_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghm")
            .join("repos.json")
    }

    /// Resolve the repository list: explicit override, then config, then default
    pub fn repos_path(config: &Config, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| config.repos.file.clone())
            .unwrap_or_else(Self::default_repos_path)
    }

    /// Resolve the cache file: explicit override, then config, then default
    pub fn cache_path(config: &Config, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| config.cache.path.clone())
            .unwrap_or_else(Self::default_cache_path)
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> GhmResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> GhmResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| GhmError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| GhmError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
