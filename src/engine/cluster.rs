// src/engine/cluster.rs

//! Second-tier executor over [`Family::Cluster`].
//!
//! Cluster classes resolve local dependencies against the cluster run itself
//! and cross-tier dependencies against one first-tier result graph per
//! member, keyed by role. A cross-tier binding is the list of
//! `(role, instances)` pairs that matched, in role order.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::executor::Executor;
use crate::engine::factory::InstanceFactory;
use crate::engine::graph::ResultGraph;
use crate::engine::instance::Instances;
use crate::engine::resolve::CrossTierSource;
use crate::errors::Result;
use crate::plugin::{Dependency, Family};
use crate::registry::Registry;
use crate::types::RoleMatch;

pub struct ClusterExecutor<'a> {
    registry: &'a Registry,
    graphs: BTreeMap<String, ResultGraph>,
    config: Option<&'a EngineConfig>,
    factory: Option<&'a dyn InstanceFactory>,
}

impl<'a> ClusterExecutor<'a> {
    /// `graphs` maps each member's role to the result of its first-tier run.
    pub fn new(registry: &'a Registry, graphs: BTreeMap<String, ResultGraph>) -> Self {
        Self {
            registry,
            graphs,
            config: None,
            factory: None,
        }
    }

    pub fn with_config(mut self, config: &'a EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_factory(mut self, factory: &'a dyn InstanceFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn graphs(&self) -> &BTreeMap<String, ResultGraph> {
        &self.graphs
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(|r| r.as_str())
    }

    pub fn run(&self) -> Result<ResultGraph> {
        let source = RoleGraphs {
            graphs: &self.graphs,
            role_match: self.config.map(|c| c.role_match()).unwrap_or_default(),
        };

        info!(members = self.graphs.len(), "starting cluster run");

        let mut executor =
            Executor::new(self.registry, Family::Cluster).with_cross_tier(&source);
        if let Some(config) = self.config {
            executor = executor.with_config(config);
        }
        if let Some(factory) = self.factory {
            executor = executor.with_factory(factory);
        }
        executor.run()
    }
}

struct RoleGraphs<'g> {
    graphs: &'g BTreeMap<String, ResultGraph>,
    role_match: RoleMatch,
}

impl CrossTierSource for RoleGraphs<'_> {
    fn collect(&self, dep: &Dependency) -> Vec<(String, Instances)> {
        self.graphs
            .iter()
            .filter(|(role, _)| {
                dep.role()
                    .is_none_or(|filter| filter.matches(role, self.role_match))
            })
            .filter_map(|(role, graph)| {
                let instances = graph.get(dep.target())?;
                if !dep.is_on_error() && instances.iter().any(|i| i.is_failed()) {
                    debug!(role = %role, dependency = %dep, "member instance failed; omitted");
                    return None;
                }
                Some((role.clone(), instances.to_vec()))
            })
            .collect()
    }
}
