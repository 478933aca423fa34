// src/engine/executor.rs

//! Single-tier executor.
//!
//! Runs every enabled class of one family in scheduler order. Per class:
//!
//! 1. skip when disabled (declared default or config override)
//! 2. resolve dependencies against the graph built so far; a
//!    [`ResolutionError`](crate::engine::ResolutionError) skips the class
//! 3. skip when any policy is unsatisfied
//! 4. create instances through the [`InstanceFactory`]
//! 5. run `process` per instance, capturing failures on the instance
//! 6. record the instances in the result graph
//!
//! Only a dependency cycle or a reference to a class under the wrong family
//! aborts a run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dag::{PluginGraph, Scheduler};
use crate::engine::factory::{InstanceFactory, SingleInstance};
use crate::engine::graph::ResultGraph;
use crate::engine::instance::{Bindings, Instance, Instances};
use crate::engine::resolve::{CrossTierSource, resolve_dependencies};
use crate::errors::Result;
use crate::plugin::{Family, PluginClass};
use crate::registry::Registry;

static SINGLE_INSTANCE: SingleInstance = SingleInstance;

/// Drives one run of one family.
pub struct Executor<'a> {
    registry: &'a Registry,
    family: Family,
    factory: &'a dyn InstanceFactory,
    config: Option<&'a EngineConfig>,
    cross_tier: Option<&'a dyn CrossTierSource>,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a Registry, family: Family) -> Self {
        Self {
            registry,
            family,
            factory: &SINGLE_INSTANCE,
            config: None,
            cross_tier: None,
        }
    }

    /// Use `factory` to decide how many instances each class gets.
    pub fn with_factory(mut self, factory: &'a dyn InstanceFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Apply per-class `enabled` overrides from `config`.
    pub fn with_config(mut self, config: &'a EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub(crate) fn with_cross_tier(mut self, source: &'a dyn CrossTierSource) -> Self {
        self.cross_tier = Some(source);
        self
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    /// The order classes will be visited in, or the cycle that prevents one.
    pub fn run_order(&self) -> Result<Vec<Arc<PluginClass>>> {
        Scheduler::new(self.registry.family(&self.family)).run_order()
    }

    pub fn run(&self) -> Result<ResultGraph> {
        self.run_from(ResultGraph::new())
    }

    /// Continue from a partial graph. Classes already in `seed` are not run
    /// again and their instances are visible to dependents.
    ///
    /// Fails before running anything when a dependency names a registered
    /// class under the wrong family, or when the family has a cycle.
    pub fn run_from(&self, seed: ResultGraph) -> Result<ResultGraph> {
        self.registry.check_references(&self.family)?;
        let order = self.run_order()?;
        let mut graph = seed;
        let seeded = graph.len();

        info!(
            family = %self.family,
            classes = order.len(),
            seeded,
            "starting run"
        );

        let mut skipped = 0usize;
        for class in &order {
            if graph.contains(class.id()) {
                debug!(plugin = %class.id(), "already in seed graph; not re-running");
                continue;
            }
            match self.run_class(class, &graph) {
                Some(instances) => graph.insert(class.id().clone(), instances),
                None => skipped += 1,
            }
        }

        info!(
            family = %self.family,
            recorded = graph.len() - seeded,
            skipped,
            failures = graph.failures().count(),
            "run finished"
        );
        Ok(graph)
    }

    fn run_class(&self, class: &PluginClass, graph: &ResultGraph) -> Option<Instances> {
        if !self.is_enabled(class) {
            debug!(plugin = %class.id(), "plugin disabled; skipping");
            return None;
        }

        let bindings = match resolve_dependencies(class, graph, self.cross_tier) {
            Ok(bindings) => bindings,
            Err(e) => {
                let static_graph = PluginGraph::from_classes(self.registry.family(&self.family));
                let downstream: Vec<String> = static_graph
                    .downstream_of(class.id())
                    .into_iter()
                    .map(|p| p.to_string())
                    .collect();
                warn!(
                    plugin = %class.id(),
                    error = %e,
                    ?downstream,
                    "unable to resolve dependencies; skipping plugin"
                );
                return None;
            }
        };

        if let Some(policy) = class.policies().iter().find(|p| !p.accept(&bindings)) {
            debug!(plugin = %class.id(), %policy, "policy not satisfied; skipping");
            return None;
        }

        let instances = self.execute(class, &bindings);
        if instances.is_empty() {
            debug!(plugin = %class.id(), "factory created no instances");
            return None;
        }
        Some(instances)
    }

    fn execute(&self, class: &PluginClass, bindings: &Bindings) -> Instances {
        self.factory
            .create(class)
            .into_iter()
            .map(|item| {
                let mut instance = Instance::new(class.id().clone(), bindings.clone(), item);
                let result = class.process(&instance);
                if let Err(e) = &result {
                    warn!(plugin = %class.id(), error = %format!("{e:#}"), "plugin failed");
                }
                instance.complete(result);
                Arc::new(instance)
            })
            .collect()
    }

    fn is_enabled(&self, class: &PluginClass) -> bool {
        match self.config {
            Some(config) => config.enabled_for(class),
            None => class.enabled(),
        }
    }
}
