//! Tracing setup for the `branchscope` binary.
//!
//! Log lines go to stderr; stdout is reserved for the run summary. The
//! filter comes from `BRANCHSCOPE_LOG`, then `RUST_LOG`, then the level
//! picked from the command line.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "BRANCHSCOPE_LOG";

/// Default level for the `--verbose` flag.
pub fn verbosity(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber. With `json`, every line is a JSON object
/// carrying the enclosing scan span.
///
/// Later calls are no-ops.
pub fn init_tracing(json: bool, level: Level) {
    let (pretty, structured) = if json {
        let layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true);
        (None, Some(layer))
    } else {
        let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(pretty)
        .with(structured)
        .try_init()
        .ok();
}
