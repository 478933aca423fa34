// src/dag/scheduler.rs

//! Run-order computation.
//!
//! Iterative depth-first traversal with an explicit pending stack:
//!
//! - pop a candidate; discard it if already emitted
//! - if all of its in-set dependencies were emitted, emit it
//! - if it was already expanded once (pushed back under its dependencies)
//!   and still has outstanding dependencies, it depends on itself: cycle
//! - otherwise push it back, then its outstanding dependencies on top
//!
//! Independent classes come out in input order, so callers that need a
//! stable order must pass a stable input.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error};

use crate::errors::{PlugdagError, Result};
use crate::plugin::{PluginClass, PluginId};

#[derive(Debug, Clone)]
pub struct Scheduler {
    classes: Vec<Arc<PluginClass>>,
    index: HashMap<PluginId, usize>,
}

impl Scheduler {
    pub fn new(classes: &[Arc<PluginClass>]) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id().clone(), i))
            .collect();
        Self {
            classes: classes.to_vec(),
            index,
        }
    }

    /// Every class after all of the classes it locally depends on.
    ///
    /// Returns [`PlugdagError::DependencyCycle`] naming the class where the
    /// cycle closed and the stack at that point.
    pub fn run_order(&self) -> Result<Vec<Arc<PluginClass>>> {
        let mut stack: Vec<usize> = (0..self.classes.len()).rev().collect();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut expanded: HashSet<usize> = HashSet::new();
        let mut order = Vec::with_capacity(self.classes.len());

        while let Some(idx) = stack.pop() {
            if seen.contains(&idx) {
                continue;
            }

            let pending = self.pending_dependencies(idx, &seen);
            if pending.is_empty() {
                seen.insert(idx);
                order.push(Arc::clone(&self.classes[idx]));
                continue;
            }

            if !expanded.insert(idx) {
                let plugin = self.classes[idx].id().to_string();
                let stack: Vec<String> = stack
                    .iter()
                    .map(|&i| self.classes[i].id().to_string())
                    .collect();
                error!(plugin = %plugin, ?stack, "dependency cycle detected");
                return Err(PlugdagError::DependencyCycle { plugin, stack });
            }

            stack.push(idx);
            // Reversed so the first declared dependency is visited first.
            stack.extend(pending.into_iter().rev());
        }

        debug!(
            order = ?order.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "computed run order"
        );
        Ok(order)
    }

    fn pending_dependencies(&self, idx: usize, seen: &HashSet<usize>) -> Vec<usize> {
        let mut pending = Vec::new();
        for target in self.classes[idx].local_dependencies() {
            if let Some(&dep) = self.index.get(target) {
                if !seen.contains(&dep) && !pending.contains(&dep) {
                    pending.push(dep);
                }
            }
        }
        pending
    }
}
