// src/engine/mod.rs

//! Execution engine.
//!
//! This module ties together:
//! - instances and their resolved bindings ([`instance`])
//! - the per-run result graph ([`graph`])
//! - instance creation ([`factory`])
//! - dependency resolution ([`resolve`])
//! - the single-tier [`Executor`] and the second-tier [`ClusterExecutor`]

pub mod cluster;
pub mod executor;
pub mod factory;
pub mod graph;
pub mod instance;
pub mod resolve;

pub use cluster::ClusterExecutor;
pub use executor::Executor;
pub use factory::{InstanceFactory, SingleInstance};
pub use graph::ResultGraph;
pub use instance::{Binding, Bindings, Instance, Instances};
pub use resolve::ResolutionError;
