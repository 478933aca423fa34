// src/engine/graph.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::instance::{Instance, Instances};
use crate::plugin::PluginId;

/// Outcome of one executor run: plugin class -> the instances it produced.
///
/// Every class that ran maps to a non-empty sequence; classes that were
/// disabled, unresolvable or filtered out by a policy are absent. Iteration
/// follows run order.
#[derive(Debug, Clone, Default)]
pub struct ResultGraph {
    order: Vec<PluginId>,
    entries: HashMap<PluginId, Instances>,
}

impl ResultGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, plugin: PluginId, instances: Instances) {
        if !self.entries.contains_key(&plugin) {
            self.order.push(plugin.clone());
        }
        self.entries.insert(plugin, instances);
    }

    pub fn get(&self, plugin: &PluginId) -> Option<&[Arc<Instance>]> {
        self.entries.get(plugin).map(|i| i.as_slice())
    }

    /// The first (for ordinary classes: the only) instance of `plugin`.
    pub fn first(&self, plugin: &PluginId) -> Option<&Arc<Instance>> {
        self.entries.get(plugin).and_then(|i| i.first())
    }

    pub fn contains(&self, plugin: &PluginId) -> bool {
        self.entries.contains_key(plugin)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &PluginId> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PluginId, &[Arc<Instance>])> {
        self.order
            .iter()
            .filter_map(|p| self.entries.get(p).map(|i| (p, i.as_slice())))
    }

    /// Every instance that captured a failure.
    pub fn failures(&self) -> impl Iterator<Item = &Arc<Instance>> {
        self.iter()
            .flat_map(|(_, instances)| instances.iter())
            .filter(|i| i.is_failed())
    }

    /// True when no instance failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
