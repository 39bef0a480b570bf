// 📝 Logging - tracing subscriber setup for the binary
// The library only emits events; installing a subscriber is the caller's job.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when RUST_LOG is not set
pub const DEFAULT_FILTER: &str = "supplement_merge=info";

/// Install a console subscriber filtered by RUST_LOG (falls back to `DEFAULT_FILTER`).
/// Logs go to stderr so stdout stays clean for the merged table.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // a second init (e.g. from tests) is a no-op
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
