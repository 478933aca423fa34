#![allow(dead_code)]

use plugdag::{Declaration, PluginId, Registry};

use crate::recorder::Recorder;

/// Builder for a plugin-family `Registry` to simplify test setup.
///
/// Plugins added with [`RegistryBuilder::plugin`] require each listed name;
/// with a recorder attached, their process logs into it.
pub struct RegistryBuilder {
    declarations: Vec<Declaration>,
    recorder: Option<Recorder>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            recorder: None,
        }
    }

    pub fn recording(mut self, recorder: &Recorder) -> Self {
        self.recorder = Some(recorder.clone());
        self
    }

    pub fn plugin(mut self, name: &str, requires: &[&str]) -> Self {
        let mut decl = requires
            .iter()
            .fold(Declaration::plugin(name), |d, dep| {
                d.requires(&PluginId::plugin(dep))
            });
        if let Some(recorder) = &self.recorder {
            decl = decl.process(recorder.process());
        }
        self.declarations.push(decl);
        self
    }

    pub fn declare(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn try_build(self) -> plugdag::Result<Registry> {
        let mut registry = Registry::new();
        for decl in self.declarations {
            registry.declare(decl)?;
        }
        Ok(registry)
    }

    pub fn build(self) -> Registry {
        self.try_build()
            .expect("Failed to build valid registry from builder")
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `n` plugins named `p0..p{n-1}`; `edges` lists `(dependent, dependency)` indices.
pub fn indexed_registry(n: usize, edges: &[(usize, usize)], recorder: &Recorder) -> Registry {
    let mut builder = RegistryBuilder::new().recording(recorder);
    for i in 0..n {
        let deps: Vec<String> = edges
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|(_, to)| format!("p{to}"))
            .collect();
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        builder = builder.plugin(&format!("p{i}"), &deps);
    }
    builder.build()
}
