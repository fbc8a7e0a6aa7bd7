//! HTTP layer: credential attachment, body capture, status classification.
//!
//! This is the ONLY place for status code handling and the only place that
//! performs the forced logout on 401. client/mod.rs never interprets status
//! codes.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ClientResult};

use super::helpers::read_body;

/// Whether a call may proceed without a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthRule {
    /// Refuse locally (status 0, UNAUTHORIZED) when no credential is stored.
    Required,
    /// Attach the credential if present, otherwise send anonymously.
    Optional,
}

/// HTTP backend (holds reqwest client, proxy base and credential store).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) store: Arc<dyn CredentialStore>,
}

impl HttpBackend {
    /// Send one request to `base_url + path`.
    ///
    /// Returns the captured body on 2xx. Any other status becomes an
    /// [`ApiError`]; a 401 additionally clears the stored credential.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&serde_json::Value>,
        auth: AuthRule,
    ) -> ClientResult<Option<serde_json::Value>> {
        let token = self.store.get();
        if token.is_none() && auth == AuthRule::Required {
            debug!(path = %path, "no credential stored, refusing request");
            return Err(ApiError::missing_credential().into());
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "sending request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if method == Method::GET || method == Method::DELETE {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = read_body(response).await;

        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.force_logout(path);
        }

        Err(ApiError::from_response(status.as_u16(), path, body).into())
    }

    /// The stored token is known invalid; drop it.
    fn force_logout(&self, path: &str) {
        warn!(path = %path, "received 401, clearing stored credential");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear credential after 401");
        }
    }
}
