// src/engine/instance.rs

//! Runtime instances and the dependency values bound to them.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::plugin::{Failure, PluginId, Value};

/// Every instance a class produced in one run. Ordinary classes produce one.
pub type Instances = Vec<Arc<Instance>>;

/// The resolved value of one dependency.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Instances from the run in progress.
    Local(Instances),
    /// Instances collected from cluster members, keyed by role in role order.
    Cluster(Vec<(String, Instances)>),
}

impl Binding {
    /// All bound instances, across roles for cluster bindings.
    pub fn instances(&self) -> Box<dyn Iterator<Item = &Arc<Instance>> + '_> {
        match self {
            Binding::Local(instances) => Box::new(instances.iter()),
            Binding::Cluster(roles) => Box::new(roles.iter().flat_map(|(_, i)| i.iter())),
        }
    }

    pub fn first(&self) -> Option<&Arc<Instance>> {
        self.instances().next()
    }

    /// Role names for cluster bindings; empty for local ones.
    pub fn roles(&self) -> Vec<&str> {
        match self {
            Binding::Local(_) => Vec::new(),
            Binding::Cluster(roles) => roles.iter().map(|(r, _)| r.as_str()).collect(),
        }
    }

    pub fn for_role(&self, role: &str) -> Option<&Instances> {
        match self {
            Binding::Local(_) => None,
            Binding::Cluster(roles) => roles.iter().find(|(r, _)| r == role).map(|(_, i)| i),
        }
    }

    pub fn has_failure(&self) -> bool {
        self.instances().any(|i| i.is_failed())
    }
}

#[derive(Debug, Clone)]
struct Slot {
    target: PluginId,
    binding: Option<Binding>,
}

/// Resolved dependencies of a class, by binding name.
///
/// A name can be bound to "no value" (optional dependency that was absent);
/// [`Bindings::contains`] is still true for it while [`Bindings::get`] is `None`.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    slots: BTreeMap<String, Slot>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, target: &PluginId, binding: Option<Binding>) {
        self.slots.insert(
            name.to_string(),
            Slot {
                target: target.clone(),
                binding,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.slots.get(name).and_then(|s| s.binding.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn by_plugin(&self, target: &PluginId) -> Option<&Binding> {
        self.slots
            .values()
            .find(|s| &s.target == target)
            .and_then(|s| s.binding.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One execution of a plugin class.
///
/// Holds the class's resolved bindings, the optional sub-item it was created
/// for, and after `process` ran, either its output or its captured failure.
#[derive(Debug, Clone)]
pub struct Instance {
    plugin: PluginId,
    bindings: Bindings,
    item: Option<Value>,
    output: Option<Value>,
    failure: Option<Failure>,
}

impl Instance {
    pub(crate) fn new(plugin: PluginId, bindings: Bindings, item: Option<Value>) -> Self {
        Self {
            plugin,
            bindings,
            item,
            output: None,
            failure: None,
        }
    }

    pub(crate) fn complete(&mut self, result: anyhow::Result<Option<Value>>) {
        match result {
            Ok(output) => self.output = output,
            Err(e) => self.failure = Some(Failure::new(e)),
        }
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Binding by declared name; `None` when absent or bound to "no value".
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains(name)
    }

    /// Binding by target class.
    pub fn by_plugin(&self, target: &PluginId) -> Option<&Binding> {
        self.bindings.by_plugin(target)
    }

    /// Typed output of the first instance bound under `name`.
    pub fn dep<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name)?.first()?.output_as::<T>()
    }

    /// The sub-item a multi-output class created this instance for.
    pub fn item(&self) -> Option<&Value> {
        self.item.as_ref()
    }

    pub fn item_as<T: Any>(&self) -> Option<&T> {
        self.item.as_ref()?.downcast_ref::<T>()
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn output_as<T: Any>(&self) -> Option<&T> {
        self.output.as_ref()?.downcast_ref::<T>()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}
