// src/lib.rs

//! `plugdag`: a declarative plugin dependency-graph engine.
//!
//! Declare plugin classes into a [`Registry`], then run a family with an
//! [`Executor`]. Results of several first-tier runs, keyed by role, feed a
//! [`ClusterExecutor`] for cluster-wide aggregation.

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod types;

pub use config::EngineConfig;
pub use engine::{
    Binding, Bindings, ClusterExecutor, Executor, Instance, InstanceFactory, ResolutionError,
    ResultGraph, SingleInstance,
};
pub use errors::{PlugdagError, Result};
pub use plugin::{
    Combinator, Declaration, Dependency, Failure, Family, PluginClass, PluginId, Policy, Process,
    Requirement, RoleFilter, Value,
};
pub use registry::Registry;
pub use types::{LogLevel, RoleMatch};
