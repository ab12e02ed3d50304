//! Configuration loading and validation

mod schema;
mod shared;

pub use schema::*;
pub use shared::SharedConfig;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
///
/// The file only seeds startup values; edits made at runtime are not
/// written back.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the defaults
pub fn load_or_default(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}
