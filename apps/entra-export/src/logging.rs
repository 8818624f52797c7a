//! Diagnostic logging on stderr using tracing.
//!
//! Normal output (the final summary) goes to stdout; everything emitted
//! through `tracing` goes to stderr so the two never mix.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,entra_user_export=info,entra_export=info";
const DEBUG_FILTER: &str = "info,entra_user_export=debug,entra_export=debug";

/// Returns the filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
