// src/plugin/declaration.rs

//! Declaring plugin classes.
//!
//! A [`Declaration`] collects a class's name, family, `enabled` default,
//! dependency [`Requirement`]s and its process. [`crate::Registry::declare`]
//! compiles it into an immutable [`PluginClass`]:
//!
//! - every requirement becomes a named [`Dependency`]; unnamed ones use the
//!   target's default binding (lowercased short name)
//! - policy members become optional dependencies, with the [`PolicyCheck`]
//!   enforcing the group
//! - a cluster-family class depending on an ordinary-family class gets a
//!   cross-tier descriptor; any other cross-family edge is rejected

use std::any::type_name;
use std::sync::Arc;

use crate::engine::Instance;
use crate::errors::{PlugdagError, Result};
use crate::plugin::class::{NoOp, PluginClass, Process};
use crate::plugin::dependency::{Dependency, DependencyKind, RoleFilter};
use crate::plugin::id::{Family, PluginId};
use crate::plugin::policy::{Policy, PolicyCheck};
use crate::plugin::value::Value;

/// One dependency entry of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Direct {
        target: PluginId,
        name: Option<String>,
    },
    Optional {
        target: PluginId,
        name: Option<String>,
    },
    ErrorTolerant {
        target: PluginId,
        name: Option<String>,
    },
    CrossTier {
        target: PluginId,
        name: Option<String>,
        role: Option<RoleFilter>,
    },
    /// A fully specified descriptor, e.g. optional *and* error tolerant.
    Descriptor(Dependency),
    Policy(Policy),
}

impl From<&PluginId> for Requirement {
    fn from(target: &PluginId) -> Self {
        Requirement::Direct {
            target: target.clone(),
            name: None,
        }
    }
}

impl From<Dependency> for Requirement {
    fn from(dep: Dependency) -> Self {
        Requirement::Descriptor(dep)
    }
}

impl From<Policy> for Requirement {
    fn from(policy: Policy) -> Self {
        Requirement::Policy(policy)
    }
}

fn descriptor(target: &PluginId, name: Option<&String>) -> Dependency {
    let dep = Dependency::new(target);
    match name {
        Some(n) => dep.named(n.clone()),
        None => dep,
    }
}

/// Builder for a plugin class.
#[derive(Clone)]
pub struct Declaration {
    name: String,
    family: Family,
    enabled: bool,
    requirements: Vec<Requirement>,
    process: Option<Arc<dyn Process>>,
    delegate: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, family: Family) -> Self {
        Self {
            name: name.into(),
            family,
            enabled: true,
            requirements: Vec::new(),
            process: None,
            delegate: false,
        }
    }

    /// An ordinary-family declaration.
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::new(name, Family::Plugin)
    }

    /// A cluster-family declaration.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self::new(name, Family::Cluster)
    }

    /// Wrap a plain function as a plugin class.
    ///
    /// The qualified name is the function's path (`my_crate::checks::uptime`).
    /// Closures and function pointers have no usable path and are rejected at
    /// registration; declare them with [`Declaration::new`] and
    /// [`Declaration::process`] instead.
    pub fn from_fn<F>(family: Family, f: F) -> Self
    where
        F: Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        let mut decl = Self::new(type_name::<F>(), family);
        decl.process = Some(Arc::new(f));
        decl.delegate = true;
        decl
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Reference to the class this declaration will register.
    pub fn id(&self) -> PluginId {
        PluginId::new(&self.name, self.family.clone())
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn require(mut self, requirement: impl Into<Requirement>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    /// Required dependency bound under the target's default name.
    pub fn requires(self, target: &PluginId) -> Self {
        self.require(target)
    }

    pub fn requires_as(self, name: impl Into<String>, target: &PluginId) -> Self {
        self.require(Requirement::Direct {
            target: target.clone(),
            name: Some(name.into()),
        })
    }

    pub fn optional(self, target: &PluginId) -> Self {
        self.require(Requirement::Optional {
            target: target.clone(),
            name: None,
        })
    }

    pub fn optional_as(self, name: impl Into<String>, target: &PluginId) -> Self {
        self.require(Requirement::Optional {
            target: target.clone(),
            name: Some(name.into()),
        })
    }

    pub fn on_error(self, target: &PluginId) -> Self {
        self.require(Requirement::ErrorTolerant {
            target: target.clone(),
            name: None,
        })
    }

    pub fn on_error_as(self, name: impl Into<String>, target: &PluginId) -> Self {
        self.require(Requirement::ErrorTolerant {
            target: target.clone(),
            name: Some(name.into()),
        })
    }

    pub fn cross_tier(self, target: &PluginId, role: Option<RoleFilter>) -> Self {
        self.require(Requirement::CrossTier {
            target: target.clone(),
            name: None,
            role,
        })
    }

    pub fn policy(self, policy: Policy) -> Self {
        self.require(policy)
    }

    /// `Any` policy over `targets`, each bound under its default name.
    pub fn any_of<'t>(self, targets: impl IntoIterator<Item = &'t PluginId>) -> Self {
        let policy = targets
            .into_iter()
            .fold(Policy::any(), |p, t| p.with_target(t));
        self.policy(policy)
    }

    pub fn process<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.process = Some(Arc::new(f));
        self
    }

    pub fn with_process(mut self, process: impl Process + 'static) -> Self {
        self.process = Some(Arc::new(process));
        self
    }

    /// Compile into an immutable class. Each call captures its own
    /// dependency list; nothing is shared between declarations.
    pub(crate) fn compile(self) -> Result<PluginClass> {
        if self.name.trim().is_empty() {
            return Err(PlugdagError::ConfigError(
                "plugin name must not be empty".to_string(),
            ));
        }
        if self.delegate && !is_item_path(&self.name) {
            return Err(PlugdagError::ConfigError(format!(
                "cannot infer a plugin name from '{}'; declare it with an explicit name",
                self.name
            )));
        }

        let id = self.id();
        let mut requires: Vec<Dependency> = Vec::new();
        let mut policies = Vec::new();

        for requirement in self.requirements {
            match requirement {
                Requirement::Direct { target, name } => {
                    let dep = descriptor(&target, name.as_ref());
                    add_dependency(&id, &mut requires, check_family(&id, dep)?)?;
                }
                Requirement::Optional { target, name } => {
                    let dep = descriptor(&target, name.as_ref()).optional();
                    add_dependency(&id, &mut requires, check_family(&id, dep)?)?;
                }
                Requirement::ErrorTolerant { target, name } => {
                    let dep = descriptor(&target, name.as_ref()).on_error();
                    add_dependency(&id, &mut requires, check_family(&id, dep)?)?;
                }
                Requirement::CrossTier { target, name, role } => {
                    let dep = descriptor(&target, name.as_ref()).cross_tier(role);
                    add_dependency(&id, &mut requires, check_family(&id, dep)?)?;
                }
                Requirement::Descriptor(dep) => {
                    add_dependency(&id, &mut requires, check_family(&id, dep)?)?;
                }
                Requirement::Policy(policy) => {
                    let mut members = Vec::new();
                    for (name, target) in policy.members() {
                        let dep = Dependency::new(target).named(name.clone()).optional();
                        let dep = check_family(&id, dep)?;
                        add_dependency(&id, &mut requires, dep.clone())?;
                        members.push(dep);
                    }
                    policies.push(PolicyCheck::new(policy.combinator(), members));
                }
            }
        }

        Ok(PluginClass {
            id,
            enabled: self.enabled,
            requires,
            policies,
            process: self.process.unwrap_or_else(|| Arc::new(NoOp)),
            delegate: self.delegate,
        })
    }
}

fn invalid(from: &PluginId, dep: &Dependency, reason: &str) -> PlugdagError {
    PlugdagError::InvalidDependency {
        from: from.to_string(),
        to: dep.target().to_string(),
        reason: reason.to_string(),
    }
}

/// Enforce the family rules, rewriting cluster -> plugin edges to cross-tier.
/// Whether a `type_name` is the path of a function item. Closures, function
/// pointers and higher-ranked signatures are not.
fn is_item_path(name: &str) -> bool {
    !(name.contains('{') || name.starts_with("fn(") || name.starts_with("for<"))
}

fn check_family(from: &PluginId, dep: Dependency) -> Result<Dependency> {
    if dep.target() == from {
        return Err(invalid(from, &dep, "a plugin cannot depend on itself"));
    }

    let from_family = from.family();
    let to_family = dep.target().family();

    match dep.kind() {
        DependencyKind::Local if from_family == to_family => Ok(dep),
        DependencyKind::Local
            if *from_family == Family::Cluster && *to_family == Family::Plugin =>
        {
            Ok(dep.cross_tier(None))
        }
        DependencyKind::Local => Err(invalid(
            from,
            &dep,
            &format!("{from_family} plugins cannot depend on {to_family} plugins"),
        )),
        DependencyKind::CrossTier { .. }
            if *from_family == Family::Cluster && *to_family == Family::Plugin =>
        {
            Ok(dep)
        }
        DependencyKind::CrossTier { .. } => Err(invalid(
            from,
            &dep,
            "cross-tier dependencies go from cluster plugins to plugin-family plugins",
        )),
    }
}

/// Add `dep` unless an identical binding exists; conflicting names are rejected.
fn add_dependency(from: &PluginId, requires: &mut Vec<Dependency>, dep: Dependency) -> Result<()> {
    match requires.iter_mut().find(|d| d.name() == dep.name()) {
        None => {
            requires.push(dep);
            Ok(())
        }
        Some(existing) if existing.target() == dep.target() && existing.kind() == dep.kind() => {
            // Shared between policies or repeated; the strictest form wins.
            if existing.is_optional() && !dep.is_optional() {
                *existing = dep;
            }
            Ok(())
        }
        Some(_) => Err(PlugdagError::DuplicateBinding {
            plugin: from.to_string(),
            binding: dep.name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> PluginId {
        PluginId::plugin("t::A")
    }

    #[test]
    fn unnamed_requirements_use_default_binding() -> Result<()> {
        let class = Declaration::plugin("t::B").requires(&a()).compile()?;
        assert_eq!(class.requires()[0].name(), "a");
        assert!(!class.requires()[0].is_optional());
        Ok(())
    }

    #[test]
    fn policy_members_become_optional_dependencies() -> Result<()> {
        let c = PluginId::plugin("t::C");
        let class = Declaration::plugin("t::E")
            .policy(Policy::any().with("a", &a()).with("c", &c))
            .compile()?;

        assert_eq!(class.requires().len(), 2);
        assert!(class.requires().iter().all(|d| d.is_optional()));
        assert_eq!(class.policies().len(), 1);
        assert_eq!(class.policies()[0].to_string(), "Any(a=t::A, c=t::C)");
        Ok(())
    }

    #[test]
    fn cluster_on_plugin_is_rewritten_to_cross_tier() -> Result<()> {
        let class = Declaration::cluster("t::Agg").requires(&a()).compile()?;
        assert!(class.requires()[0].is_cross_tier());
        assert_eq!(class.local_dependencies().count(), 0);
        Ok(())
    }

    #[test]
    fn plugin_on_cluster_is_invalid() {
        let agg = PluginId::cluster("t::Agg");
        let err = Declaration::plugin("t::B").requires(&agg).compile();
        assert!(matches!(err, Err(PlugdagError::InvalidDependency { .. })));
    }

    #[test]
    fn custom_family_cannot_reach_other_families() {
        let err = Declaration::new("t::Mine", Family::custom("mine"))
            .requires(&a())
            .compile();
        assert!(matches!(err, Err(PlugdagError::InvalidDependency { .. })));
    }

    #[test]
    fn cross_tier_from_plugin_family_is_invalid() {
        let err = Declaration::plugin("t::B").cross_tier(&a(), None).compile();
        assert!(matches!(err, Err(PlugdagError::InvalidDependency { .. })));
    }

    #[test]
    fn self_dependency_is_invalid() {
        let err = Declaration::plugin("t::A").requires(&a()).compile();
        assert!(matches!(err, Err(PlugdagError::InvalidDependency { .. })));
    }

    #[test]
    fn conflicting_binding_names_are_rejected() {
        let b = PluginId::plugin("t::B");
        let err = Declaration::plugin("t::C")
            .requires_as("x", &a())
            .requires_as("x", &b)
            .compile();
        assert!(matches!(err, Err(PlugdagError::DuplicateBinding { .. })));
    }

    #[test]
    fn shared_policy_member_keeps_required_form() -> Result<()> {
        let class = Declaration::plugin("t::D")
            .requires(&a())
            .policy(Policy::all().with_target(&a()))
            .compile()?;
        assert_eq!(class.requires().len(), 1);
        assert!(!class.requires()[0].is_optional());
        Ok(())
    }

    #[test]
    fn closures_cannot_infer_names() {
        let err = Declaration::from_fn(Family::Plugin, |_ctx: &Instance| Ok(None)).compile();
        assert!(matches!(err, Err(PlugdagError::ConfigError(_))));
    }

    fn uptime(_ctx: &Instance) -> anyhow::Result<Option<Value>> {
        Ok(Some(Value::new(42u32)))
    }

    fn load(_ctx: &Instance) -> anyhow::Result<Option<Value>> {
        Ok(Some(Value::new(0.5f64)))
    }

    type Handler = fn(&Instance) -> anyhow::Result<Option<Value>>;

    #[test]
    fn function_pointers_cannot_infer_names() {
        let handlers: [Handler; 2] = [uptime, load];
        for handler in handlers {
            let err = Declaration::from_fn(Family::Plugin, handler).compile();
            assert!(matches!(err, Err(PlugdagError::ConfigError(_))));
        }
    }

    #[test]
    fn functions_are_named_after_their_path() -> Result<()> {
        let class = Declaration::from_fn(Family::Plugin, uptime).compile()?;
        assert!(class.name().ends_with("::uptime"));
        assert_eq!(class.id().default_binding(), "uptime");
        assert!(class.is_delegate());
        Ok(())
    }
}
