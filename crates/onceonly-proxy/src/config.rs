//! Proxy configuration.

use std::env;
use std::time::Duration;

use tracing::warn;
use url::Url;

/// Upstream target and limits for the proxy route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Upstream API base. `None` makes every proxied request fail with 500.
    pub api_base: Option<Url>,

    /// Upstream request timeout.
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProxyConfig {
    /// Load from `ONCEONLY_API_BASE` and `ONCEONLY_PROXY_TIMEOUT_SECS`.
    ///
    /// An empty or unparseable base is treated as unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = env::var("ONCEONLY_API_BASE") {
            cfg.api_base = parse_base(&v);
        }

        if let Ok(v) = env::var("ONCEONLY_PROXY_TIMEOUT_SECS") {
            match v.trim().parse() {
                Ok(secs) => cfg.timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %v, "ignoring invalid ONCEONLY_PROXY_TIMEOUT_SECS"),
            }
        }

        cfg
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = parse_base(base);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upstream URL for `rest` (the path after the proxy prefix) and the raw query.
    pub(crate) fn target(&self, rest: &str, query: Option<&str>) -> Option<String> {
        let base = self.api_base.as_ref()?;
        let mut target = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            rest.trim_start_matches('/')
        );
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }
}

fn parse_base(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!(scheme = %url.scheme(), "ONCEONLY_API_BASE must be http(s); treating as unset");
            None
        }
        Err(e) => {
            warn!(error = %e, "ONCEONLY_API_BASE is not a valid URL; treating as unset");
            None
        }
    }
}
