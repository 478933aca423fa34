use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use plugdag::{Instance, Value};

/// Shared log of the plugins whose `process` ran, in call order.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    ran: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A process that records the plugin name and returns no output.
    pub fn process(
        &self,
    ) -> impl Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static {
        let ran = Arc::clone(&self.ran);
        move |ctx: &Instance| {
            ran.lock().unwrap().push(ctx.plugin().name().to_string());
            Ok(None)
        }
    }

    /// A process that records the plugin name, then fails with `message`.
    pub fn failing(
        &self,
        message: &str,
    ) -> impl Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static {
        let ran = Arc::clone(&self.ran);
        let message = message.to_string();
        move |ctx: &Instance| {
            ran.lock().unwrap().push(ctx.plugin().name().to_string());
            Err(anyhow!("{message}"))
        }
    }

    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.ran.lock().unwrap().iter().position(|n| n == name)
    }
}

/// A process that always returns `value`.
pub fn constant<T>(
    value: T,
) -> impl Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    move |_ctx: &Instance| Ok(Some(Value::new(value.clone())))
}

/// A process that always fails with `message`.
pub fn failing(
    message: &str,
) -> impl Fn(&Instance) -> anyhow::Result<Option<Value>> + Send + Sync + 'static {
    let message = message.to_string();
    move |_ctx: &Instance| Err(anyhow!("{message}"))
}
