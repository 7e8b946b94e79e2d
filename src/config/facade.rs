//! ConfigLoader facade delegating to merge service.

use super::merge::MergeService;
use super::EdgewiseConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `root/edgewise.toml` (if present) and environment.
    pub fn load(root: &Path) -> Result<EdgewiseConfig, ConfigError> {
        MergeService::load(root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<EdgewiseConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> EdgewiseConfig {
        EdgewiseConfig::default()
    }
}
