// src/config/mod.rs

//! Optional TOML run configuration.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{from_str, load_and_validate, load_from_path};
pub use model::{ClusterSection, EngineConfig, EngineSection, PluginOverride};
pub use validate::validate_against;
