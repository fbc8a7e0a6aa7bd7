//! Proxy failures and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failures produced by the proxy itself (never by the upstream).
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No upstream base configured.
    #[error("Missing ONCEONLY_API_BASE")]
    MissingBase,

    /// The upstream could not be reached or its body could not be read.
    #[error("Proxy connection failed")]
    Upstream(#[source] reqwest::Error),

    /// The upstream client could not be built.
    #[error("failed to create upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingBase | Self::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        // Upstream details stay in the log, not the response.
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type for proxy handlers.
pub type ProxyResult<T> = Result<T, ProxyError>;
