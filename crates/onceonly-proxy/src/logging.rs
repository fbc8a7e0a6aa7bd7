//! Tracing subscriber setup for the console binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Install a global subscriber. Default level `info`, override via `RUST_LOG`.
///
/// Returns an error if a global subscriber is already set.
pub fn init(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(true).compact())
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()?,
    }

    Ok(())
}
