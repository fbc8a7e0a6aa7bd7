use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use onceonly_proxy::logging::{self, LogFormat};
use onceonly_proxy::ProxyConfig;
use tracing::{info, warn};

/// Serve the OnceOnly console proxy route.
#[derive(Debug, Parser)]
#[command(name = "onceonly-console", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "ONCEONLY_CONSOLE_ADDR", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init(if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    })?;

    let config = ProxyConfig::from_env();
    match &config.api_base {
        Some(base) => info!(upstream = %base, "forwarding to upstream"),
        None => warn!("ONCEONLY_API_BASE is not set; proxied requests will fail with 500"),
    }

    let app = onceonly_proxy::router(config)?;
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    onceonly_proxy::serve(listener, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    Ok(())
}
