//! Same-origin reverse proxy for the OnceOnly console.
//!
//! Browser and CLI clients call `/api/proxy/<path>` on the console origin;
//! the route forwards to `<ONCEONLY_API_BASE>/<path>` with the caller's
//! bearer token and relays the upstream response unchanged.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ONCEONLY_API_BASE` | Upstream API base URL (required for forwarding) |
//! | `ONCEONLY_PROXY_TIMEOUT_SECS` | Upstream timeout in seconds (default: 30) |
//! | `ONCEONLY_CONSOLE_ADDR` | Listen address of `onceonly-console` (default: `127.0.0.1:3000`) |

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub mod config;
pub mod error;
pub mod logging;
pub mod route;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use route::ProxyState;

/// Path prefix served by the proxy.
pub const PROXY_PREFIX: &str = "/api/proxy";

pub const PROXY_USER_AGENT: &str = concat!("onceonly-console/", env!("CARGO_PKG_VERSION"));

/// Build the proxy router.
pub fn router(config: ProxyConfig) -> ProxyResult<Router> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(PROXY_USER_AGENT)
        .build()
        .map_err(ProxyError::Client)?;

    let state = Arc::new(ProxyState { config, client });

    Ok(Router::new()
        .route(
            "/api/proxy/{*path}",
            get(route::forward)
                .post(route::forward)
                .delete(route::forward)
                .options(route::preflight),
        )
        .with_state(state))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "console proxy listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("console proxy shutting down");
        })
        .await
}
