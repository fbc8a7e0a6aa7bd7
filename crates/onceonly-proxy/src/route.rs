//! `/api/proxy/*` handler.
//!
//! Each request is forwarded independently. Only `Authorization` and
//! `Content-Type` are carried over; `Accept` is always `application/json`.
//! Status and body come back verbatim, and the content type falls back to
//! `application/json` when the upstream sends none.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::PROXY_PREFIX;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
}

/// Forward GET, POST and DELETE to the upstream.
pub async fn forward(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match relay(&state, method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ProxyError::Upstream(source) => {
                    error!(path = %uri.path(), error = %source, "proxy upstream request failed")
                }
                other => error!(path = %uri.path(), error = %other, "proxy request rejected"),
            }
            err.into_response()
        }
    }
}

/// Preflight: empty 204.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn relay(
    state: &ProxyState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> ProxyResult<Response> {
    let rest = strip_prefix(uri.path());
    let target = state
        .config
        .target(rest, uri.query())
        .ok_or(ProxyError::MissingBase)?;

    debug!(method = %method, target = %target, "forwarding request");

    let mut request = state
        .client
        .request(method.clone(), &target)
        .header(ACCEPT, "application/json");

    for name in [AUTHORIZATION, CONTENT_TYPE] {
        if let Some(value) = headers.get(&name) {
            request = request.header(name, value.clone());
        }
    }

    if method == Method::POST {
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(ProxyError::Upstream)?;
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let bytes = upstream.bytes().await.map_err(ProxyError::Upstream)?;

    debug!(status = status.as_u16(), bytes = bytes.len(), "relaying upstream response");

    Ok((status, [(CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Path after the proxy prefix, without its leading slash.
fn strip_prefix(path: &str) -> &str {
    path.strip_prefix(PROXY_PREFIX)
        .unwrap_or(path)
        .trim_start_matches('/')
}
