// src/plugin/class.rs

use std::fmt;
use std::sync::Arc;

use crate::engine::Instance;
use crate::plugin::dependency::Dependency;
use crate::plugin::id::{Family, PluginId};
use crate::plugin::policy::PolicyCheck;
use crate::plugin::value::Value;

/// The work a plugin class performs for one instance.
///
/// `ctx` exposes the resolved dependency bindings (and, for multi-output
/// classes, the sub-item the instance was created for). Returning `Err`
/// marks the instance as failed; the run continues regardless.
pub trait Process: Send + Sync {
    fn process(&self, ctx: &Instance) -> anyhow::Result<Option<Value>>;
}

impl<F> Process for F
where
    F: Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync,
{
    fn process(&self, ctx: &Instance) -> anyhow::Result<Option<Value>> {
        self(ctx)
    }
}

/// Stand-in for declarations that never supply a process.
pub(crate) struct NoOp;

impl Process for NoOp {
    fn process(&self, _ctx: &Instance) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }
}

/// An immutable, registered plugin class.
///
/// Built from a [`crate::Declaration`] by the registry; the engine only ever
/// reads it.
pub struct PluginClass {
    pub(crate) id: PluginId,
    pub(crate) enabled: bool,
    pub(crate) requires: Vec<Dependency>,
    pub(crate) policies: Vec<PolicyCheck>,
    pub(crate) process: Arc<dyn Process>,
    pub(crate) delegate: bool,
}

impl PluginClass {
    pub fn id(&self) -> &PluginId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn family(&self) -> &Family {
        self.id.family()
    }

    /// Declared default; a run configuration may override it.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Every descriptor, including optional policy members, in declaration order.
    pub fn requires(&self) -> &[Dependency] {
        &self.requires
    }

    pub fn policies(&self) -> &[PolicyCheck] {
        &self.policies
    }

    /// Whether `process` delegates to a plain function.
    pub fn is_delegate(&self) -> bool {
        self.delegate
    }

    /// Targets that must run before this class within the same family.
    pub fn local_dependencies(&self) -> impl Iterator<Item = &PluginId> {
        self.requires
            .iter()
            .filter(|d| !d.is_cross_tier())
            .map(|d| d.target())
    }

    pub fn process(&self, ctx: &Instance) -> anyhow::Result<Option<Value>> {
        self.process.process(ctx)
    }
}

impl fmt::Debug for PluginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClass")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("requires", &self.requires)
            .field("policies", &self.policies)
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}
