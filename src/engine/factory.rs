// src/engine/factory.rs

//! Pluggable instance creation.
//!
//! The executor asks an `InstanceFactory` how many instances a class gets.
//! The default, [`SingleInstance`], creates exactly one. A mapper-style layer
//! can return one item per matching input, so a multi-output class yields an
//! ordered collection of instances, or none at all (the class is then absent).

use crate::plugin::{PluginClass, Value};

pub trait InstanceFactory {
    /// One entry per instance to create; `None` means "no sub-item".
    fn create(&self, class: &PluginClass) -> Vec<Option<Value>>;
}

/// One instance per class, with no sub-item.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleInstance;

impl InstanceFactory for SingleInstance {
    fn create(&self, _class: &PluginClass) -> Vec<Option<Value>> {
        vec![None]
    }
}

impl<F> InstanceFactory for F
where
    F: Fn(&PluginClass) -> Vec<Option<Value>>,
{
    fn create(&self, class: &PluginClass) -> Vec<Option<Value>> {
        self(class)
    }
}
