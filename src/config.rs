// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load configuration for a run.
///
/// A missing or unreadable file falls back to defaults; environment
/// overrides are applied on top and the result is validated.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Load configuration strictly: the file must exist and parse.
pub fn load_config_strict(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}
