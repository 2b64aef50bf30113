use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so the prompts and the
/// confirmation line own stdout.
///
/// The filter comes from `PRICESHEET_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("PRICESHEET_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
