// src/engine/resolve.rs

//! Per-class dependency resolution.

use thiserror::Error;
use tracing::debug;

use crate::engine::graph::ResultGraph;
use crate::engine::instance::{Binding, Bindings, Instances};
use crate::plugin::{Dependency, DependencyKind, PluginClass, PluginId};

/// Why a class could not be resolved. Never fatal to a run: the class is
/// skipped and is absent from the result graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Missing Dependency: {0}")]
    MissingDependency(PluginId),

    #[error("Dependency has failure: {0}")]
    DependencyFailed(PluginId),
}

/// Supplies cross-tier dependencies: per-role instances of a target class.
pub(crate) trait CrossTierSource {
    fn collect(&self, dep: &Dependency) -> Vec<(String, Instances)>;
}

/// Resolve every descriptor of `class` against the graph built so far.
pub(crate) fn resolve_dependencies(
    class: &PluginClass,
    graph: &ResultGraph,
    cross_tier: Option<&dyn CrossTierSource>,
) -> Result<Bindings, ResolutionError> {
    let mut bindings = Bindings::new();

    for dep in class.requires() {
        let binding = match dep.kind() {
            DependencyKind::Local => resolve_local(dep, graph)?,
            DependencyKind::CrossTier { .. } => resolve_cross_tier(dep, cross_tier)?,
        };
        bindings.insert(dep.name(), dep.target(), binding);
    }

    debug!(plugin = %class.id(), bound = bindings.len(), "resolved dependencies");
    Ok(bindings)
}

fn resolve_local(
    dep: &Dependency,
    graph: &ResultGraph,
) -> Result<Option<Binding>, ResolutionError> {
    let Some(instances) = graph.get(dep.target()) else {
        return absent(dep);
    };

    if !dep.is_on_error() && instances.iter().any(|i| i.is_failed()) {
        if dep.is_optional() {
            debug!(dependency = %dep, "optional dependency failed; binding no value");
            return Ok(None);
        }
        return Err(ResolutionError::DependencyFailed(dep.target().clone()));
    }

    Ok(Some(Binding::Local(instances.to_vec())))
}

fn resolve_cross_tier(
    dep: &Dependency,
    source: Option<&dyn CrossTierSource>,
) -> Result<Option<Binding>, ResolutionError> {
    let members = source.map(|s| s.collect(dep)).unwrap_or_default();
    if members.is_empty() {
        return absent(dep);
    }
    Ok(Some(Binding::Cluster(members)))
}

fn absent(dep: &Dependency) -> Result<Option<Binding>, ResolutionError> {
    if dep.is_optional() {
        Ok(None)
    } else {
        Err(ResolutionError::MissingDependency(dep.target().clone()))
    }
}
