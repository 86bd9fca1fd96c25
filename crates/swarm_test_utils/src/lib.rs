//! # Swarm Test Utilities
//!
//! Shared testing utilities for the bot crates:
//! - Snapshot fixtures and a builder with predictable IDs
//! - Scripted command sinks
//! - A sandbox engine for multi-tick runs
//! - Determinism harness and property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod sandbox;
pub mod sinks;

/// Re-export proptest for convenience.
pub use proptest;

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING: Once = Once::new();

/// Route bot logs through the test writer. Filter with `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
