// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::plugin::PluginClass;
use crate::types::{LogLevel, RoleMatch};

/// Run configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// log_level = "debug"
///
/// [cluster]
/// role_match = "prefix"
///
/// [plugin."checks::Disk"]
/// enabled = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub cluster: ClusterSection,

    /// Per-class overrides keyed by qualified plugin name.
    #[serde(default)]
    pub plugin: BTreeMap<String, PluginOverride>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Handed to [`crate::logging::init_logging`] by the embedding program.
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

/// `[cluster]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSection {
    /// How string role filters match member roles.
    #[serde(default)]
    pub role_match: RoleMatch,
}

/// `[plugin."<name>"]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginOverride {
    /// Overrides the declared `enabled` default when set.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl EngineConfig {
    /// Effective enabled flag: the override if present, else the declared default.
    pub fn enabled_for(&self, class: &PluginClass) -> bool {
        self.plugin
            .get(class.name())
            .and_then(|o| o.enabled)
            .unwrap_or_else(|| class.enabled())
    }

    pub fn role_match(&self) -> RoleMatch {
        self.cluster.role_match
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.engine.log_level
    }
}
