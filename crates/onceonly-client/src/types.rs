//! Wire types for the OnceOnly API and client configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account status returned by `GET /v1/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Plan identifier (e.g., "free", "starter", "pro").
    pub plan: String,

    /// Masked API key (e.g., "oo_live_…a1b2").
    #[serde(default)]
    pub key_preview: String,

    #[serde(default)]
    pub is_active: bool,

    /// End of the current billing period.
    #[serde(default)]
    pub current_period_end: Option<String>,

    /// Lifetime request count.
    #[serde(default)]
    pub total_requests: u64,

    /// Lifetime blocked (duplicate) count.
    #[serde(default)]
    pub total_blocked: u64,
}

/// Legacy single-category usage from `GET /v1/usage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub plan: String,

    /// Billing month (YYYY-MM).
    #[serde(default)]
    pub month: String,

    pub usage: u64,

    pub limit: u64,
}

/// One usage category (automation or AI agent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageCategory {
    #[serde(default)]
    pub usage: u64,

    #[serde(default)]
    pub limit: u64,

    /// Requests this month.
    #[serde(default)]
    pub month_total: u64,

    /// Requests blocked this month.
    #[serde(default)]
    pub month_blocked: u64,
}

impl UsageCategory {
    /// Fraction of the limit used, clamped to `0.0..=1.0`. A zero limit reads as empty.
    pub fn ratio(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.usage as f64 / self.limit as f64).clamp(0.0, 1.0)
    }
}

/// Split usage from `GET /v1/usage/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub plan: String,

    #[serde(default)]
    pub month: Option<String>,

    #[serde(default)]
    pub automation: UsageCategory,

    #[serde(default)]
    pub ai: UsageCategory,
}

/// Event time: epoch seconds or an ISO string, depending on the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTimestamp {
    Epoch(f64),
    Text(String),
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epoch(secs) => write!(f, "{}", secs),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl EventTimestamp {
    /// Human-readable local time; falls back to the raw value when unparseable.
    pub fn to_local_string(&self) -> String {
        use chrono::{DateTime, Local, TimeZone};

        let parsed = match self {
            Self::Epoch(secs) => Local
                .timestamp_opt(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
                .single(),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Local)),
        };

        parsed
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

/// One entry of `GET /v1/events`, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Type tag ("duplicate", "locked", "over_limit", "ai_acquired", ...).
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub ts: Option<EventTimestamp>,

    #[serde(default)]
    pub first_seen_at: Option<EventTimestamp>,

    #[serde(default)]
    pub done_at: Option<EventTimestamp>,

    /// Deduplication key.
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub req_id: Option<String>,

    #[serde(default)]
    pub lease_id: Option<String>,

    #[serde(default)]
    pub error_code: Option<String>,

    #[serde(default)]
    pub result_hash: Option<String>,

    /// 1 when the action was billed.
    #[serde(default)]
    pub charged: Option<u8>,
}

impl EventRecord {
    /// AI lease lifecycle events carry a lease id or an `ai_` type prefix.
    pub fn is_ai(&self) -> bool {
        self.lease_id.is_some() || self.kind.starts_with("ai_")
    }

    pub fn is_charged(&self) -> bool {
        self.charged == Some(1)
    }

    /// First timestamp present among `ts`, `first_seen_at`, `done_at`.
    pub fn when(&self) -> Option<&EventTimestamp> {
        self.ts
            .as_ref()
            .or(self.first_seen_at.as_ref())
            .or(self.done_at.as_ref())
    }

    pub fn label(&self) -> &str {
        match self.kind.as_str() {
            "duplicate" => "Duplicate Blocked",
            "over_limit" => "Limit Reached",
            "locked" => "New Lock Created",
            "ai_acquired" => "AI Lease Acquired",
            "ai_in_progress" => "AI In Progress",
            "ai_completed" => "AI Task Completed",
            "ai_failed" => "AI Task Failed",
            "ai_extended" => "AI Lease Extended",
            "ai_canceled" => "AI Canceled",
            "ai_over_limit" => "AI Limit Reached",
            other => other,
        }
    }
}

/// One calendar day of `GET /v1/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    /// YYYY-MM-DD
    pub day: String,

    #[serde(default)]
    pub checks_total: u64,

    #[serde(default)]
    pub duplicates_blocked: u64,

    #[serde(default)]
    pub locks_created: u64,

    #[serde(default)]
    pub rate_limited: u64,

    #[serde(default)]
    pub ai_acquired: u64,

    #[serde(default)]
    pub ai_completed: u64,

    #[serde(default)]
    pub ai_failed: u64,
}

/// Paid plans offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPlan {
    Starter,
    Pro,
    Agency,
}

impl CheckoutPlan {
    pub const ALL: [CheckoutPlan; 3] = [Self::Starter, Self::Pro, Self::Agency];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Agency => "agency",
        }
    }
}

impl fmt::Display for CheckoutPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "agency" => Ok(Self::Agency),
            other => Err(format!(
                "unknown plan '{}' (expected starter, pro or agency)",
                other
            )),
        }
    }
}

/// Response of `GET /v1/billing/checkout-url`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CheckoutUrl {
    #[serde(default)]
    pub url: Option<String>,
}

/// Response of `POST /v1/recover-rotate`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RotatedKey {
    #[serde(default)]
    pub api_key: Option<String>,
}

// ==================== GOVERNANCE ====================

/// Webhook tool registered in a scope.
///
/// The secret is write-only: reads return only `has_secret` and a mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,

    #[serde(default = "default_scope")]
    pub scope_id: String,

    pub url: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub timeout_ms: u64,

    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub has_secret: bool,

    #[serde(default)]
    pub secret_mask: Option<String>,
}

pub(crate) fn default_scope() -> String {
    "global".to_string()
}

/// Signing configuration sent with a tool upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolAuth {
    #[serde(rename = "type")]
    pub kind: String,

    pub secret: String,
}

impl ToolAuth {
    pub fn hmac_sha256(secret: impl Into<String>) -> Self {
        Self {
            kind: "hmac_sha256".to_string(),
            secret: secret.into(),
        }
    }
}

/// Body of `POST /v1/tools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUpsert {
    pub name: String,

    pub url: String,

    #[serde(default)]
    pub scope_id: String,

    pub auth: ToolAuth,

    pub timeout_ms: u64,

    pub max_retries: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ToolUpsert {
    pub fn new(name: impl Into<String>, url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            scope_id: default_scope(),
            auth: ToolAuth::hmac_sha256(secret),
            timeout_ms: 15_000,
            max_retries: 2,
            enabled: None,
            description: None,
        }
    }

    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = scope_id.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Response of `POST /v1/tools/{name}/toggle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolToggled {
    pub name: String,
    pub enabled: bool,
}

/// Response of `DELETE /v1/tools/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeleted {
    #[serde(default)]
    pub ok: bool,
    pub deleted: String,
    #[serde(default = "default_scope")]
    pub scope_id: String,
}

/// Allow/deny lists and ceilings of an agent policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRules {
    #[serde(default)]
    pub allowed_tools: Vec<String>,

    #[serde(default)]
    pub blocked_tools: Vec<String>,

    #[serde(default)]
    pub max_actions_per_hour: Option<u64>,

    #[serde(default)]
    pub max_spend_usd_per_day: Option<f64>,
}

/// Policy record keyed by agent id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub agent_id: String,

    #[serde(default)]
    pub policy: PolicyRules,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /v1/policies/{agent_id}`. Unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tools: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_actions_per_hour: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_spend_usd_per_day: Option<f64>,
}

impl PolicyUpsert {
    /// Build from form-style values where empty lists and zero ceilings mean "unset".
    pub fn from_form(
        allowed_tools: Vec<String>,
        blocked_tools: Vec<String>,
        max_actions_per_hour: u64,
        max_spend_usd_per_day: f64,
    ) -> Self {
        Self {
            allowed_tools: (!allowed_tools.is_empty()).then_some(allowed_tools),
            blocked_tools: (!blocked_tools.is_empty()).then_some(blocked_tools),
            max_actions_per_hour: (max_actions_per_hour > 0).then_some(max_actions_per_hour),
            max_spend_usd_per_day: (max_spend_usd_per_day > 0.0).then_some(max_spend_usd_per_day),
        }
    }
}

/// Server-side policy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyTemplate {
    Strict,
    Moderate,
    Permissive,
    ReadOnly,
    SupportBot,
}

impl FromStr for PolicyTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "moderate" => Ok(Self::Moderate),
            "permissive" => Ok(Self::Permissive),
            "read_only" => Ok(Self::ReadOnly),
            "support_bot" => Ok(Self::SupportBot),
            other => Err(format!("unknown policy template '{}'", other)),
        }
    }
}

/// Response of the agent enable/disable endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: String,

    pub is_enabled: bool,

    #[serde(default)]
    pub disabled_reason: Option<String>,

    #[serde(default)]
    pub disabled_at: Option<String>,
}

/// Aggregation window for agent metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsPeriod {
    Hour,
    #[default]
    Day,
    Week,
}

impl MetricsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl FromStr for MetricsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(format!("unknown period '{}' (expected hour, day or week)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCount {
    pub tool: String,
    pub count: u64,
}

/// Response of `GET /v1/agents/{agent_id}/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_id: String,

    pub period: String,

    #[serde(default)]
    pub total_actions: u64,

    #[serde(default)]
    pub blocked_actions: u64,

    #[serde(default)]
    pub total_spend_usd: f64,

    #[serde(default)]
    pub top_tools: Vec<ToolCount>,
}

// ==================== CONFIG ====================

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the console that serves the proxy route.
    pub console_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            console_url: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ONCEONLY_CONSOLE_URL") {
            if !url.trim().is_empty() {
                config.console_url = url.trim().to_string();
            }
        }

        if let Ok(timeout) = std::env::var("ONCEONLY_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = secs;
            }
        }

        config
    }

    pub fn with_console_url(mut self, url: impl Into<String>) -> Self {
        self.console_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
