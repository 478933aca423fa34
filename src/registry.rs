// src/registry.rs

//! Registry of declared plugin classes, bucketed by family.
//!
//! The registry is an explicit value owned by the caller: declare every class
//! first, then hand the registry to executors. Executors only read it, so
//! declaring while a run is in progress is not possible.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::dag::PluginGraph;
use crate::errors::{PlugdagError, Result};
use crate::plugin::{Declaration, Family, PluginClass, PluginId};

#[derive(Debug, Default)]
pub struct Registry {
    families: BTreeMap<Family, Vec<Arc<PluginClass>>>,
    by_name: HashMap<String, Arc<PluginClass>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and file a declaration under its family.
    ///
    /// Fails on an invalid dependency (see [`Declaration`]) or when the
    /// qualified name is already taken, in any family.
    pub fn declare(&mut self, declaration: Declaration) -> Result<PluginId> {
        if self.by_name.contains_key(declaration.name()) {
            return Err(PlugdagError::DuplicatePlugin(declaration.name().to_string()));
        }

        let class = Arc::new(declaration.compile()?);
        let id = class.id().clone();

        debug!(
            plugin = %id,
            family = %id.family(),
            requires = class.requires().len(),
            policies = class.policies().len(),
            "declared plugin"
        );

        self.families
            .entry(id.family().clone())
            .or_default()
            .push(Arc::clone(&class));
        self.by_name.insert(id.name().to_string(), class);
        Ok(id)
    }

    /// Classes of `family` in declaration order.
    pub fn family(&self, family: &Family) -> &[Arc<PluginClass>] {
        self.families
            .get(family)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.keys()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PluginClass>> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Classes (of any family) declared under the module path `module`.
    pub fn in_module(&self, module: &str) -> Vec<Arc<PluginClass>> {
        self.families
            .values()
            .flatten()
            .filter(|c| c.id().in_module(module))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Check a family before running it.
    ///
    /// - every dependency on a registered class must name that class's real
    ///   family (forward references are checked here)
    /// - the family's dependency graph must be acyclic
    pub fn validate(&self, family: &Family) -> Result<()> {
        self.check_references(family)?;
        PluginGraph::from_classes(self.family(family)).validate_acyclic()
    }

    /// Every dependency on a registered class must carry that class's family.
    pub fn check_references(&self, family: &Family) -> Result<()> {
        for class in self.family(family) {
            for dep in class.requires() {
                let target = dep.target();
                if let Some(registered) = self.by_name.get(target.name()) {
                    if registered.family() != target.family() {
                        return Err(PlugdagError::InvalidDependency {
                            from: class.id().to_string(),
                            to: target.to_string(),
                            reason: format!(
                                "declared as a {} reference but registered in family {}",
                                target.family(),
                                registered.family()
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Static dependency graph of `family`.
    pub fn graph(&self, family: &Family) -> PluginGraph {
        PluginGraph::from_classes(self.family(family))
    }
}
