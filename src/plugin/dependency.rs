// src/plugin/dependency.rs

//! Dependency descriptors: the typed edges between plugin classes.

use std::fmt;

use crate::plugin::id::PluginId;
use crate::types::RoleMatch;

/// Selects which cluster members a cross-tier dependency collects from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleFilter {
    /// Matched using the configured [`RoleMatch`] (exact unless overridden).
    Named(String),
    Exact(String),
    Prefix(String),
}

impl RoleFilter {
    pub fn named(role: impl Into<String>) -> Self {
        RoleFilter::Named(role.into())
    }

    pub fn matches(&self, role: &str, mode: RoleMatch) -> bool {
        match (self, mode) {
            (RoleFilter::Exact(r), _) | (RoleFilter::Named(r), RoleMatch::Exact) => role == r,
            (RoleFilter::Prefix(p), _) | (RoleFilter::Named(p), RoleMatch::Prefix) => {
                role.starts_with(p.as_str())
            }
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleFilter::Named(r) => f.write_str(r),
            RoleFilter::Exact(r) => write!(f, "={r}"),
            RoleFilter::Prefix(p) => write!(f, "{p}*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyKind {
    /// Resolved against the result graph of the run in progress.
    Local,
    /// Resolved by a cluster executor against per-member result graphs.
    CrossTier { role: Option<RoleFilter> },
}

/// A resolved edge from a declaring class to `target`.
///
/// `name` is the binding under which the resolved value is visible to the
/// dependent instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    target: PluginId,
    name: String,
    optional: bool,
    on_error: bool,
    kind: DependencyKind,
}

impl Dependency {
    pub fn new(target: &PluginId) -> Self {
        Self {
            name: target.default_binding(),
            target: target.clone(),
            optional: false,
            on_error: false,
            kind: DependencyKind::Local,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Absence resolves to "no value" instead of failing resolution.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// A failed target is still delivered, carrying its captured failure.
    pub fn on_error(mut self) -> Self {
        self.on_error = true;
        self
    }

    pub fn cross_tier(mut self, role: Option<RoleFilter>) -> Self {
        self.kind = DependencyKind::CrossTier { role };
        self
    }

    pub fn target(&self) -> &PluginId {
        &self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_on_error(&self) -> bool {
        self.on_error
    }

    pub fn kind(&self) -> &DependencyKind {
        &self.kind
    }

    pub fn is_cross_tier(&self) -> bool {
        matches!(self.kind, DependencyKind::CrossTier { .. })
    }

    pub fn role(&self) -> Option<&RoleFilter> {
        match &self.kind {
            DependencyKind::CrossTier { role } => role.as_ref(),
            DependencyKind::Local => None,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DependencyKind::Local => write!(f, "Dependency({}", self.target)?,
            DependencyKind::CrossTier { role } => {
                write!(f, "CrossTierDependency({}", self.target)?;
                if let Some(role) = role {
                    write!(f, ", role=\"{role}\"")?;
                }
            }
        }
        write!(
            f,
            ", name=\"{}\", optional={}, on_error={})",
            self.name, self.optional, self.on_error
        )
    }
}
