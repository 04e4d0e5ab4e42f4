//! Logging setup for binding hosts.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"info"`
/// or `"pulsar_blocking_bridge=debug"`) is used. Returns `false` if a
/// subscriber was already installed.
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
