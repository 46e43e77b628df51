//! Configuration schema for ghm
//!
//! Configuration is stored at `~/.config/ghm/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub CLI settings
    pub gh: GhConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Managed repositories
    pub repos: ReposConfig,
}

/// GitHub CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GhConfig {
    /// Path or name of the gh binary
    pub binary: String,

    /// GitHub host (for GitHub Enterprise), passed as GH_HOST
    pub host: Option<String>,
}

impl Default for GhConfig {
    fn default() -> Self {
        Self {
            binary: "gh".to_string(),
            host: None,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file location (default: `<cache dir>/ghm/cache.json`)
    pub path: Option<PathBuf>,
}

/// Managed repositories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReposConfig {
    /// JSON array of OWNER/REPO names (default: `<config dir>/ghm/repos.json`)
    pub file: Option<PathBuf>,
}
