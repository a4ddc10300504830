//! Shared test utilities for basic-snmp integration tests.

// Not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod fixtures;
mod stream;

pub use agent::*;
pub use fixtures::*;
pub use stream::collect_stream;

/// Route library logs to the test harness; `RUST_LOG` selects what shows.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
