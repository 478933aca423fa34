//! Shared scaffolding for `plugdag` tests.
//!
//! - [`init_tracing`] installs a per-test log capture once per process.
//! - [`builders`] declares whole registries from compact shapes.
//! - [`recorder`] provides processes that log run order, return constants or fail.

pub mod builders;
pub mod recorder;

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Output goes through `with_test_writer()`, so the harness only shows it for
/// failing tests (or with `-- --nocapture`).
///
/// The filter comes from `PLUGDAG_LOG`, then `RUST_LOG`, else `warn`:
/// `PLUGDAG_LOG=plugdag=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PLUGDAG_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}
