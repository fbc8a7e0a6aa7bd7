//! Terminal rendering.
//!
//! Formatting functions return strings so they can be tested; callers print.
//! Error presentation looks only at the status and code of a failure.

use onceonly_client::{
    AccountInfo, AgentMetrics, AgentStatus, CheckoutPlan, ClientError, ErrorCode, EventRecord,
    MetricsRow, Policy, Tool, Usage, UsageCategory, UsageSnapshot,
};
use serde::Serialize;

const BAR_WIDTH: usize = 24;

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// What the user should do about `err`.
pub fn error_banner(err: &ClientError) -> String {
    match err.code() {
        ErrorCode::Unauthorized => {
            "Not logged in or the API key was rejected. Run `onceonly login`.".to_string()
        }
        code @ (ErrorCode::PaymentRequired | ErrorCode::RateLimited) => {
            let headline = if code == ErrorCode::PaymentRequired {
                "Your plan is inactive or an invoice is unpaid."
            } else {
                "You have hit your plan's rate limit."
            };
            let plans: Vec<_> = CheckoutPlan::ALL.iter().map(|p| p.as_str()).collect();
            format!(
                "{}\nUpgrade with `onceonly upgrade <{}>`.",
                headline,
                plans.join("|")
            )
        }
        ErrorCode::Unknown => {
            let detail = err
                .as_api()
                .and_then(|e| e.body_message())
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            format!("Failed to load: {}", detail)
        }
    }
}

/// `[█████░░░░] 42% (420/1000)`
pub fn usage_bar(category: &UsageCategory) -> String {
    let ratio = category.ratio();
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}% ({}/{})",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        ratio * 100.0,
        category.usage,
        category.limit
    )
}

pub fn account(me: &AccountInfo) -> String {
    let mut out = format!(
        "Plan:        {}{}\nKey:         {}\n",
        me.plan,
        if me.is_active { "" } else { " (inactive)" },
        me.key_preview
    );
    if let Some(end) = &me.current_period_end {
        out.push_str(&format!("Renews:      {}\n", end));
    }
    out.push_str(&format!(
        "Requests:    {}\nBlocked:     {}",
        me.total_requests, me.total_blocked
    ));
    out
}

pub fn usage_snapshot(usage: &UsageSnapshot) -> String {
    format!(
        "Plan {} ({})\n  automation  {}  blocked {}\n  ai agents   {}  blocked {}",
        usage.plan,
        usage.month.as_deref().unwrap_or("current month"),
        usage_bar(&usage.automation),
        usage.automation.month_blocked,
        usage_bar(&usage.ai),
        usage.ai.month_blocked,
    )
}

pub fn legacy_usage(usage: &Usage) -> String {
    let category = UsageCategory {
        usage: usage.usage,
        limit: usage.limit,
        ..Default::default()
    };
    format!("Plan {} ({})\n  {}", usage.plan, usage.month, usage_bar(&category))
}

pub fn event_line(event: &EventRecord) -> String {
    let when = event
        .when()
        .map(|t| t.to_local_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("{:<19}  {:<18}", when, event.label());
    if let Some(key) = &event.key {
        line.push_str(&format!("  key={}", key));
    }
    if let Some(lease) = &event.lease_id {
        line.push_str(&format!("  lease={}", lease));
    }
    if let Some(code) = &event.error_code {
        line.push_str(&format!("  error={}", code));
    }
    if event.is_charged() {
        line.push_str("  (charged)");
    }
    line
}

pub fn metrics_table(rows: &[MetricsRow]) -> String {
    let mut out = format!(
        "{:<10}  {:>7}  {:>7}  {:>7}  {:>7}  {:>6}  {:>6}  {:>6}",
        "day", "checks", "dupes", "locks", "limited", "ai_acq", "ai_ok", "ai_err"
    );
    for r in rows {
        out.push_str(&format!(
            "\n{:<10}  {:>7}  {:>7}  {:>7}  {:>7}  {:>6}  {:>6}  {:>6}",
            r.day,
            r.checks_total,
            r.duplicates_blocked,
            r.locks_created,
            r.rate_limited,
            r.ai_acquired,
            r.ai_completed,
            r.ai_failed
        ));
    }
    out
}

pub fn tool_line(tool: &Tool) -> String {
    format!(
        "{:<24} {:<4} {}  scope={} timeout={}ms retries={}{}",
        tool.name,
        if tool.enabled { "on" } else { "off" },
        tool.url,
        tool.scope_id,
        tool.timeout_ms,
        tool.max_retries,
        tool.secret_mask
            .as_deref()
            .map(|m| format!(" secret={}", m))
            .unwrap_or_default()
    )
}

pub fn policy(policy: &Policy) -> String {
    let rules = &policy.policy;
    let list = |v: &[String]| if v.is_empty() { "-".to_string() } else { v.join(", ") };
    format!(
        "Agent:       {}\nAllowed:     {}\nBlocked:     {}\nMax/hour:    {}\nMax $/day:   {}",
        policy.agent_id,
        list(&rules.allowed_tools),
        list(&rules.blocked_tools),
        rules
            .max_actions_per_hour
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
        rules
            .max_spend_usd_per_day
            .map_or_else(|| "-".to_string(), |n| format!("{:.2}", n)),
    )
}

pub fn agent_status(status: &AgentStatus) -> String {
    if status.is_enabled {
        format!("{} enabled", status.agent_id)
    } else {
        format!(
            "{} disabled{}",
            status.agent_id,
            status
                .disabled_reason
                .as_deref()
                .map(|r| format!(": {}", r))
                .unwrap_or_default()
        )
    }
}

pub fn agent_metrics(m: &AgentMetrics) -> String {
    let mut out = format!(
        "{} ({})\n  actions {}  blocked {}  spend ${:.2}",
        m.agent_id, m.period, m.total_actions, m.blocked_actions, m.total_spend_usd
    );
    for t in &m.top_tools {
        out.push_str(&format!("\n  {:<24} {}", t.tool, t.count));
    }
    out
}
