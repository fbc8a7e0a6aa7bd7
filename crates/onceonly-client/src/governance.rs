//! Tools, policies and agent lifecycle endpoints.
//!
//! Every path segment and scope value is percent-encoded. Tool operations
//! default to the `global` scope.

use tracing::debug;

use crate::client::{enc, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::types::{
    default_scope, AgentMetrics, AgentStatus, MetricsPeriod, Policy, PolicyTemplate,
    PolicyUpsert, Tool, ToolAuth, ToolDeleted, ToolToggled, ToolUpsert,
};

/// Default page size for agent audit logs.
pub const DEFAULT_AGENT_LOG_LIMIT: u32 = 100;

fn scope_or_global(scope_id: Option<&str>) -> String {
    match scope_id.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default_scope(),
    }
}

impl ApiClient {
    // ==================== TOOLS ====================

    pub async fn list_tools(&self, scope_id: Option<&str>) -> ClientResult<Vec<Tool>> {
        let scope = scope_or_global(scope_id);
        self.get(&format!("/v1/tools?scope_id={}", enc(&scope))).await
    }

    pub async fn get_tool(&self, name: &str, scope_id: Option<&str>) -> ClientResult<Tool> {
        let scope = scope_or_global(scope_id);
        self.get(&format!("/v1/tools/{}?scope_id={}", enc(name), enc(&scope)))
            .await
    }

    /// Create or replace a tool. The signing scheme is always HMAC-SHA256.
    pub async fn upsert_tool(&self, payload: &ToolUpsert) -> ClientResult<Tool> {
        if payload.name.trim().is_empty() || payload.url.trim().is_empty() {
            return Err(ClientError::InvalidInput {
                message: "tool name and url are required".to_string(),
            });
        }

        let mut payload = payload.clone();
        payload.scope_id = scope_or_global(Some(&payload.scope_id));
        let secret = std::mem::take(&mut payload.auth.secret);
        payload.auth = ToolAuth::hmac_sha256(secret);

        debug!(tool = %payload.name, scope = %payload.scope_id, "upserting tool");
        self.post("/v1/tools", &payload).await
    }

    pub async fn toggle_tool(
        &self,
        name: &str,
        enabled: bool,
        scope_id: Option<&str>,
    ) -> ClientResult<ToolToggled> {
        let scope = scope_or_global(scope_id);
        self.post(
            &format!("/v1/tools/{}/toggle?scope_id={}", enc(name), enc(&scope)),
            &serde_json::json!({ "enabled": enabled }),
        )
        .await
    }

    pub async fn delete_tool(
        &self,
        name: &str,
        scope_id: Option<&str>,
    ) -> ClientResult<ToolDeleted> {
        let scope = scope_or_global(scope_id);
        self.delete(&format!("/v1/tools/{}?scope_id={}", enc(name), enc(&scope)))
            .await
    }

    // ==================== POLICIES ====================

    pub async fn get_policy(&self, agent_id: &str) -> ClientResult<Policy> {
        self.get(&format!("/v1/policies/{}", enc(agent_id))).await
    }

    pub async fn list_policies(&self) -> ClientResult<Vec<Policy>> {
        self.get("/v1/policies").await
    }

    /// Create or update; last write wins upstream.
    pub async fn upsert_policy(
        &self,
        agent_id: &str,
        payload: &PolicyUpsert,
    ) -> ClientResult<Policy> {
        let mut body = serde_json::to_value(payload).map_err(|e| ClientError::InvalidInput {
            message: format!("failed to serialize policy: {}", e),
        })?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert("agent_id".to_string(), serde_json::json!(agent_id));
        }

        self.post(&format!("/v1/policies/{}", enc(agent_id)), &body)
            .await
    }

    pub async fn policy_from_template(
        &self,
        agent_id: &str,
        template: PolicyTemplate,
        overrides: Option<serde_json::Value>,
    ) -> ClientResult<Policy> {
        self.post(
            &format!("/v1/policies/{}/from-template", enc(agent_id)),
            &serde_json::json!({
                "agent_id": agent_id,
                "template": template,
                "overrides": overrides,
            }),
        )
        .await
    }

    // ==================== AGENTS ====================

    /// Kill switch.
    pub async fn disable_agent(
        &self,
        agent_id: &str,
        reason: Option<&str>,
    ) -> ClientResult<AgentStatus> {
        self.post(
            &format!("/v1/agents/{}/disable", enc(agent_id)),
            &serde_json::json!({ "reason": reason }),
        )
        .await
    }

    pub async fn enable_agent(&self, agent_id: &str) -> ClientResult<AgentStatus> {
        self.post(
            &format!("/v1/agents/{}/enable", enc(agent_id)),
            &serde_json::json!({}),
        )
        .await
    }

    /// Audit log entries; their shape is not fixed upstream.
    pub async fn agent_logs(
        &self,
        agent_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<serde_json::Value>> {
        self.get(&format!("/v1/agents/{}/logs?limit={}", enc(agent_id), limit))
            .await
    }

    pub async fn agent_metrics(
        &self,
        agent_id: &str,
        period: MetricsPeriod,
    ) -> ClientResult<AgentMetrics> {
        self.get(&format!(
            "/v1/agents/{}/metrics?period={}",
            enc(agent_id),
            period.as_str()
        ))
        .await
    }
}
