// SPDX-License-Identifier: MIT

//! Loads an [`EngineConfig`] from an on-disk document. Format
//! is chosen by file extension: `.toml` or `.hcl`.

use crate::document::EngineConfig;
use crate::error::ConfigError;
use crate::validate::validate;
use std::path::Path;

pub fn load_from_path(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => load_from_toml(&contents)?,
        Some("hcl") => load_from_hcl(&contents)?,
        _ => return Err(ConfigError::UnknownFormat { path: path.to_path_buf() }),
    };

    validate(&config)?;
    Ok(config)
}

pub fn load_from_toml(contents: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(contents)?;
    Ok(config)
}

pub fn load_from_hcl(contents: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = hcl::from_str(contents)?;
    Ok(config)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
