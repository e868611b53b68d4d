//! Diagnostic logging.
//!
//! Operator-facing output goes through `ui::messages`; this is the tracing
//! side, written to stderr and filtered by `RUST_LOG` (default `warn`).

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
