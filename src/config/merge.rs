//! MergeService: orchestrates sources and deserializes to EdgewiseConfig.

use crate::config::sources::{environment, workspace_file};
use crate::config::EdgewiseConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> workspace file -> environment (highest).
    pub fn load(root: &Path) -> Result<EdgewiseConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = workspace_file::add_to_builder(builder, root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<EdgewiseConfig, ConfigError> {
        let path = path.to_str().ok_or_else(|| {
            ConfigError::Message(format!("config path is not valid UTF-8: {:?}", path))
        })?;

        let builder = builder_with_defaults()?;
        let builder = builder.add_source(File::new(path, FileFormat::Toml));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}

/// Builder seeded with the serialized defaults so every key exists.
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&EdgewiseConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
