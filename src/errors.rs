// src/errors.rs

//! Crate-wide error types.
//!
//! [`PlugdagError`] covers configuration problems: they are fatal and surface
//! before any plugin runs. Problems that only affect a single class during a
//! run live in [`crate::engine::ResolutionError`] and never escape an executor.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlugdagError {
    #[error("Duplicate plugin name: {0}")]
    DuplicatePlugin(String),

    #[error("Invalid dependency {from} on {to}: {reason}")]
    InvalidDependency {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Duplicate binding '{binding}' on plugin {plugin}")]
    DuplicateBinding { plugin: String, binding: String },

    #[error("Cycle detected involving plugin '{plugin}' (stack: [{}])", stack.join(", "))]
    DependencyCycle { plugin: String, stack: Vec<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plugin not found: {0}")]
    UnknownPlugin(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlugdagError>;
