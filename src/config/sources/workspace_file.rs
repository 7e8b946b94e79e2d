//! Optional `edgewise.toml` in the working root

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "edgewise.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(builder);
    }
    let path = path.to_str().ok_or_else(|| {
        ConfigError::Message(format!("config path is not valid UTF-8: {:?}", path))
    })?;
    Ok(builder.add_source(File::new(path, FileFormat::Toml)))
}
