//! Diagnostics go to stderr so command output stays pipeable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default level `warn` (`debug` with `--verbose`), override via `RUST_LOG`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .try_init();
}
