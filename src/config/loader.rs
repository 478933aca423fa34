// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::EngineConfig;
use crate::config::validate::validate_against;
use crate::errors::Result;
use crate::registry::Registry;

/// Read and deserialize a configuration file.
///
/// This only performs TOML deserialization; overrides are not checked
/// against a registry. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    from_str(&contents)
}

/// Deserialize a configuration from TOML text.
pub fn from_str(contents: &str) -> Result<EngineConfig> {
    let config: EngineConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file and check it against `registry`.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Rejects `[plugin."<name>"]` sections naming unregistered classes.
pub fn load_and_validate(path: impl AsRef<Path>, registry: &Registry) -> Result<EngineConfig> {
    let config = load_from_path(path)?;
    validate_against(&config, registry)?;
    Ok(config)
}
