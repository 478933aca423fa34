// src/plugin/mod.rs

//! The declaration model.
//!
//! - [`id`] names plugin classes and the families they belong to.
//! - [`dependency`] holds the typed edges between classes.
//! - [`policy`] holds the `Any` / `All` combinators.
//! - [`declaration`] is the builder callers use to declare a class.
//! - [`class`] is the compiled, immutable class and its `Process` trait.
//! - [`value`] holds type-erased outputs and captured failures.

pub mod class;
pub mod declaration;
pub mod dependency;
pub mod id;
pub mod policy;
pub mod value;

pub use class::{PluginClass, Process};
pub use declaration::{Declaration, Requirement};
pub use dependency::{Dependency, DependencyKind, RoleFilter};
pub use id::{Family, PluginId};
pub use policy::{Combinator, Policy, PolicyCheck};
pub use value::{Failure, Value};
