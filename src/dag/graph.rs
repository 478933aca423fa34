// src/dag/graph.rs

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use crate::errors::{PlugdagError, Result};
use crate::plugin::{PluginClass, PluginId};

/// Static dependency graph of one family's plugin classes.
///
/// Edge direction: dependency -> dependent. Only local edges whose target is
/// part of the same class set are included; cross-tier edges and references to
/// classes outside the set never constrain ordering.
///
/// The executor does not schedule from this graph (see
/// [`crate::dag::Scheduler`]); it is used for validation and diagnostics.
#[derive(Debug, Clone)]
pub struct PluginGraph {
    graph: DiGraph<PluginId, ()>,
    index: HashMap<PluginId, NodeIndex>,
}

impl PluginGraph {
    pub fn from_classes(classes: &[Arc<PluginClass>]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for class in classes {
            let node = graph.add_node(class.id().clone());
            index.insert(class.id().clone(), node);
        }

        for class in classes {
            let Some(&to) = index.get(class.id()) else {
                continue;
            };
            for target in class.local_dependencies() {
                if let Some(&from) = index.get(target) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self { graph, index }
    }

    pub fn plugins(&self) -> impl Iterator<Item = &PluginId> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Immediate dependencies of `plugin` within the set.
    pub fn dependencies_of(&self, plugin: &PluginId) -> Vec<&PluginId> {
        self.neighbors(plugin, Direction::Incoming)
    }

    /// Immediate dependents of `plugin` within the set.
    pub fn dependents_of(&self, plugin: &PluginId) -> Vec<&PluginId> {
        self.neighbors(plugin, Direction::Outgoing)
    }

    /// Classes with no dependencies inside the set.
    pub fn roots(&self) -> Vec<&PluginId> {
        self.graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Every class reachable downstream of `plugin`, excluding itself.
    pub fn downstream_of(&self, plugin: &PluginId) -> Vec<&PluginId> {
        let Some(&start) = self.index.get(plugin) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, start);
        let mut out = Vec::new();
        while let Some(n) = bfs.next(&self.graph) {
            if n != start {
                out.push(&self.graph[n]);
            }
        }
        out
    }

    /// Fail with [`PlugdagError::DependencyCycle`] if the set contains a cycle.
    ///
    /// The reported stack lists the members of the offending strongly
    /// connected component.
    pub fn validate_acyclic(&self) -> Result<()> {
        match toposort(&self.graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => {
                let node = cycle.node_id();
                let members = tarjan_scc(&self.graph)
                    .into_iter()
                    .find(|scc| scc.contains(&node))
                    .unwrap_or_else(|| vec![node]);
                Err(PlugdagError::DependencyCycle {
                    plugin: self.graph[node].to_string(),
                    stack: members.iter().map(|&n| self.graph[n].to_string()).collect(),
                })
            }
        }
    }

    fn neighbors(&self, plugin: &PluginId, dir: Direction) -> Vec<&PluginId> {
        match self.index.get(plugin) {
            Some(&n) => self
                .graph
                .neighbors_directed(n, dir)
                .map(|m| &self.graph[m])
                .collect(),
            None => Vec::new(),
        }
    }
}
