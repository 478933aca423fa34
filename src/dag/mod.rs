// src/dag/mod.rs

//! Plugin dependency graphs and scheduling.
//!
//! - [`graph`] holds a petgraph view of a family's dependency edges, used for
//!   validation and diagnostics.
//! - [`scheduler`] computes the order the executor runs classes in and
//!   detects cycles while doing so.

pub mod graph;
pub mod scheduler;

pub use graph::PluginGraph;
pub use scheduler::Scheduler;
