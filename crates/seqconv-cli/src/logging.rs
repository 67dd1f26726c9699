//! Log output for the CLI.
//!
//! Events go to stderr so stdout stays machine-readable JSON. The filter is
//! read from `SEQCONV_LOG`, then `RUST_LOG`, and defaults to `warn`.

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter = filter_directive(|name| env::var(name).ok());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    // Only fails when a global subscriber already exists.
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

fn filter_directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("SEQCONV_LOG")
        .or_else(|| lookup("RUST_LOG"))
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_FILTER))
}
