//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Hosts that don't install their
//! own subscriber can call [`init_tracing`]; `RUST_LOG` takes precedence over
//! the default filter. Audit records use the `deepcopy::audit` target.

use tracing_subscriber::EnvFilter;

/// Target for audit records emitted by copy processing
pub const AUDIT_TARGET: &str = "deepcopy::audit";

/// Install a formatting subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}
