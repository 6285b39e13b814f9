//! Logging setup
//!
//! Diagnostics go to stderr so the rendered graph on stdout stays
//! machine-consumable. `RUST_LOG` overrides the defaults.

use tracing_subscriber::EnvFilter;

pub(crate) fn init(debug: bool) {
    let default = if debug {
        "fluidmap=debug,kube=info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}
