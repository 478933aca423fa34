// src/plugin/id.rs

//! Plugin identity: the qualified name plus the family it is scheduled in.

use std::fmt;
use std::sync::Arc;

/// An independently scheduled pool of plugin classes.
///
/// `Plugin` is the ordinary, per-run family. `Cluster` classes run in the
/// second tier and may reach into `Plugin` results of every cluster member.
/// `Custom` families are caller-defined pools with no cross-family access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Plugin,
    Cluster,
    Custom(String),
}

impl Family {
    pub fn custom(name: impl Into<String>) -> Self {
        Family::Custom(name.into())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Plugin => f.write_str("plugin"),
            Family::Cluster => f.write_str("cluster"),
            Family::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// Reference to a plugin class by qualified name.
///
/// Returned by [`crate::Registry::declare`]; it can also be built ahead of a
/// declaration to express forward references. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId {
    name: Arc<str>,
    family: Family,
}

impl PluginId {
    pub fn new(name: impl AsRef<str>, family: Family) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            family,
        }
    }

    /// Shorthand for an ordinary-family reference.
    pub fn plugin(name: impl AsRef<str>) -> Self {
        Self::new(name, Family::Plugin)
    }

    /// Shorthand for a cluster-family reference.
    pub fn cluster(name: impl AsRef<str>) -> Self {
        Self::new(name, Family::Cluster)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Last path segment of the qualified name (`a::b::Check` and `a.b.Check`
    /// both yield `Check`).
    pub fn short_name(&self) -> &str {
        let tail = self.name.rsplit("::").next().unwrap_or(&self.name);
        tail.rsplit('.').next().unwrap_or(tail)
    }

    /// Binding name used when a declaration does not name the dependency.
    pub fn default_binding(&self) -> String {
        self.short_name().to_lowercase()
    }

    /// Whether this plugin lives under `module` (a `::` or `.` separated path).
    pub fn in_module(&self, module: &str) -> bool {
        let module = module.trim_end_matches("::").trim_end_matches('.');
        match self.name.strip_prefix(module) {
            Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
