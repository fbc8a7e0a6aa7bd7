//! Authenticated client for the console proxy.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::credentials::CredentialStore;
use crate::date::DayRange;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    AccountInfo, CheckoutPlan, CheckoutUrl, ClientConfig, EventRecord, MetricsRow, RotatedKey,
    Usage, UsageSnapshot,
};

mod helpers;
mod http;

pub(crate) use helpers::enc;
use helpers::decode;
use http::{AuthRule, HttpBackend};

/// Same-origin prefix under which the console forwards to the upstream API.
pub const PROXY_PREFIX: &str = "/api/proxy";

pub const CLIENT_USER_AGENT: &str = concat!("onceonly-client/", env!("CARGO_PKG_VERSION"));

/// Client for the OnceOnly API, reached through the console proxy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpBackend,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = format!(
            "{}{}",
            config.console_url.trim_end_matches('/'),
            PROXY_PREFIX
        );

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                store,
            },
        })
    }

    /// GET `path`. Refused without a network call when no credential is stored.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body = self
            .http
            .request(Method::GET, path, None, AuthRule::Required)
            .await?;
        decode(path, body)
    }

    /// POST `payload` as JSON. The credential is attached only if one is stored.
    pub async fn post<B, T>(&self, path: &str, payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(payload).map_err(|e| ClientError::InvalidInput {
            message: format!("failed to serialize request body: {}", e),
        })?;
        let body = self
            .http
            .request(Method::POST, path, Some(&payload), AuthRule::Optional)
            .await?;
        decode(path, body)
    }

    /// DELETE `path`. Same credential rule as [`ApiClient::get`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body = self
            .http
            .request(Method::DELETE, path, None, AuthRule::Required)
            .await?;
        decode(path, body)
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.http.store
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.store.is_authenticated()
    }

    /// Proxy base every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    // ==================== ACCOUNT ====================

    pub async fn me(&self) -> ClientResult<AccountInfo> {
        self.get("/v1/me").await
    }

    /// Legacy single-category usage.
    pub async fn usage(&self) -> ClientResult<Usage> {
        self.get("/v1/usage").await
    }

    /// Usage split into automation and AI agent categories.
    pub async fn usage_all(&self) -> ClientResult<UsageSnapshot> {
        self.get("/v1/usage/all").await
    }

    /// Most-recent-first page of at most `limit` events.
    pub async fn events(
        &self,
        limit: u32,
        offset: Option<usize>,
    ) -> ClientResult<Vec<EventRecord>> {
        let path = match offset {
            Some(offset) => format!("/v1/events?limit={}&offset={}", limit, offset),
            None => format!("/v1/events?limit={}", limit),
        };
        self.get(&path).await
    }

    /// One row per day in `range`, ascending as returned.
    pub async fn metrics(&self, range: &DayRange) -> ClientResult<Vec<MetricsRow>> {
        let path = format!(
            "/v1/metrics?from_day={}&to_day={}",
            range.from_day(),
            range.to_day()
        );
        self.get(&path).await
    }

    /// Resolve the checkout page for `plan`.
    pub async fn checkout_url(&self, plan: CheckoutPlan) -> ClientResult<String> {
        let path = format!("/v1/billing/checkout-url?plan={}", plan.as_str());
        let response: CheckoutUrl = self.get(&path).await?;

        match response.url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(ClientError::InvalidResponse {
                message: format!("no checkout URL returned for plan {}", plan),
            }),
        }
    }

    // ==================== SESSION ====================

    /// Store `api_key` and verify it against `/v1/me`.
    ///
    /// An invalid key comes back 401 and is cleared again by the HTTP layer.
    pub async fn login(&self, api_key: &str) -> ClientResult<AccountInfo> {
        self.http.store.set(api_key)?;
        let me = self.me().await?;
        info!(plan = %me.plan, "logged in");
        Ok(me)
    }

    pub fn logout(&self) -> ClientResult<()> {
        debug!("logging out");
        self.http.store.clear()
    }

    /// Ask upstream to e-mail a recovery link. No credential needed.
    pub async fn request_recovery(&self, email: &str) -> ClientResult<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(ClientError::InvalidInput {
                message: "please enter a valid email address".to_string(),
            });
        }

        let _: serde_json::Value = self
            .post("/v1/recover", &serde_json::json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Exchange a recovery token for a fresh API key and store it.
    pub async fn rotate_recovered_key(&self, token: &str) -> ClientResult<String> {
        let response: RotatedKey = self
            .post("/v1/recover-rotate", &serde_json::json!({ "token": token }))
            .await?;

        let api_key = match response.api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(ClientError::InvalidResponse {
                    message: "recovery did not return an API key".to_string(),
                })
            }
        };

        self.http.store.set(&api_key)?;
        info!("stored recovered API key");
        Ok(api_key.trim().to_string())
    }
}

fn is_valid_email(email: &str) -> bool {
    use std::sync::OnceLock;

    static EMAIL: OnceLock<Option<regex::Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| regex::Regex::new(r"\S+@\S+\.\S+").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}
