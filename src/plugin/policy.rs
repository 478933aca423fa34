// src/plugin/policy.rs

//! `Any` / `All` policies over a named group of dependencies.
//!
//! Policy members are resolved like optional dependencies; the policy, not the
//! resolver, decides whether the group is satisfied.

use std::fmt;

use crate::engine::Bindings;
use crate::plugin::dependency::Dependency;
use crate::plugin::id::PluginId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// At least one member resolved to a value.
    Any,
    /// Every member resolved to a value.
    All,
}

/// A policy as written in a declaration: binding name -> target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    combinator: Combinator,
    members: Vec<(String, PluginId)>,
}

impl Policy {
    pub fn any() -> Self {
        Self {
            combinator: Combinator::Any,
            members: Vec::new(),
        }
    }

    pub fn all() -> Self {
        Self {
            combinator: Combinator::All,
            members: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, target: &PluginId) -> Self {
        self.members.push((name.into(), target.clone()));
        self
    }

    /// Adds `target` under its default binding name.
    pub fn with_target(self, target: &PluginId) -> Self {
        let name = target.default_binding();
        self.with(name, target)
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn members(&self) -> &[(String, PluginId)] {
        &self.members
    }
}

/// A compiled policy whose members are optional [`Dependency`] descriptors.
#[derive(Debug, Clone)]
pub struct PolicyCheck {
    combinator: Combinator,
    members: Vec<Dependency>,
}

impl PolicyCheck {
    pub(crate) fn new(combinator: Combinator, members: Vec<Dependency>) -> Self {
        Self {
            combinator,
            members,
        }
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn members(&self) -> &[Dependency] {
        &self.members
    }

    /// Evaluate the policy against a class's resolved bindings.
    pub fn accept(&self, resolved: &Bindings) -> bool {
        let met = |d: &Dependency| resolved.get(d.name()).is_some();
        match self.combinator {
            Combinator::Any => self.members.iter().any(met),
            Combinator::All => self.members.iter().all(met),
        }
    }
}

impl fmt::Display for PolicyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.combinator {
            Combinator::Any => "Any",
            Combinator::All => "All",
        };
        let members: Vec<String> = self
            .members
            .iter()
            .map(|d| format!("{}={}", d.name(), d.target()))
            .collect();
        write!(f, "{label}({})", members.join(", "))
    }
}
