//! Log setup for the wallet binary.
//!
//! Diagnostics go to stderr only. Stdout is reserved for what the user asked
//! for (a phrase, a DID, a JSON document) so commands compose in pipes.
//! The library emits `debug!` events on derivation and DID creation; none of
//! them carry key material, so raising the level is safe.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose events `--log-level` controls.
const OWN_CRATES: [&str; 2] = ["prism_wallet", "prism_identity"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Colored, one event per line, with source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Filter directives for `level`: our crates at `level`, everything else at
/// `warn`. A value that already looks like a directive list (`a=b,...`) is
/// passed through untouched.
fn directives(level: &str) -> String {
    if level.contains('=') {
        return level.to_string();
    }
    let mut parts = vec!["warn".to_string()];
    parts.extend(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")));
    parts.join(",")
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// ```text
/// RUST_LOG=prism_identity=debug prism-wallet did create ...
/// ```
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, "logging initialized");
}
