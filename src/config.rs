//! Configuration
//!
//! Layered settings for the mapper, the sled store and logging. Sources are
//! merged lowest to highest: built-in defaults, `edgewise.toml` (or an
//! explicit file), then `EDGEWISE__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod xdg;

pub use facade::ConfigLoader;

use crate::cache::DEFAULT_CAPACITY;
use crate::error::ApiError;
pub use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgewiseConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached identities; zero is treated as one
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Graph store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled directory. Relative paths resolve against the working root;
    /// None means `$XDG_DATA_HOME/edgewise/graph`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the store directory to an actual filesystem location.
    pub fn resolve_path(&self, root: &Path) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(root.join(path)),
            None => Ok(xdg::data_dir()?.join("graph")),
        }
    }
}
