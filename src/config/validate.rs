// src/config/validate.rs

use crate::config::model::EngineConfig;
use crate::errors::{PlugdagError, Result};
use crate::registry::Registry;

/// Check that every per-plugin override names a registered class.
pub fn validate_against(config: &EngineConfig, registry: &Registry) -> Result<()> {
    for name in config.plugin.keys() {
        if name.trim().is_empty() {
            return Err(PlugdagError::ConfigError(
                "[plugin] section with an empty plugin name".to_string(),
            ));
        }
        if !registry.contains(name) {
            return Err(PlugdagError::UnknownPlugin(name.clone()));
        }
    }
    Ok(())
}
