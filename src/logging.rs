// src/logging.rs
// =============================================================================
// Sets up diagnostics on stderr with tracing-subscriber.
//
// stdout is reserved for discovered links, so everything else (progress,
// warnings, errors) goes through `tracing` to stderr. RUST_LOG overrides the
// default level, e.g. RUST_LOG=crawl_links=trace to see every filter
// decision.
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_logger(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
