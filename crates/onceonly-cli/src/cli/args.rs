use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use onceonly_client::{CheckoutPlan, MetricsPeriod, PolicyTemplate};

#[derive(Parser, Debug)]
#[command(
    name = "onceonly",
    version,
    about = "OnceOnly console: account, usage, events and agent governance"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Console origin serving /api/proxy
    #[arg(long, global = true, env = "ONCEONLY_CONSOLE_URL")]
    pub console_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "ONCEONLY_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Credential file (default: <config dir>/onceonly/onceonly_api_key)
    #[arg(long, global = true, env = "ONCEONLY_CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store an API key and verify it
    Login(LoginArgs),
    /// Forget the stored API key
    Logout,
    /// Show account status
    Me,
    /// Show this month's usage
    Usage(UsageArgs),
    /// Show recent events
    Events(EventsArgs),
    /// Show daily metrics
    Metrics(MetricsArgs),
    /// Print the checkout page for a plan
    Upgrade(UpgradeArgs),
    /// Request a key recovery e-mail
    Recover(RecoverArgs),
    /// Exchange a recovery token for a new API key
    RecoverRotate(RecoverRotateArgs),
    /// Manage webhook tools
    Tools(ToolsArgs),
    /// Manage agent policies
    Policy(PolicyArgs),
    /// Agent kill switch, logs and metrics
    Agent(AgentArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// API key; prompted for when omitted
    #[arg(long, env = "ONCEONLY_API_KEY", hide_env_values = true)]
    pub key: Option<String>,
}

#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Single-category usage (pre AI-agent accounts)
    #[arg(long)]
    pub legacy: bool,
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Page size
    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    /// Keep polling and print new events as they arrive
    #[arg(long, conflicts_with = "pages")]
    pub follow: bool,

    /// Poll interval for --follow (1 to 86400)
    #[arg(
        long,
        default_value_t = 7,
        value_parser = clap::value_parser!(u64).range(1..=86_400)
    )]
    pub interval_secs: u64,

    /// Older pages to load after the first
    #[arg(long, default_value_t = 0)]
    pub pages: u32,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Days ending today, used when --from/--to are not given
    #[arg(long, default_value_t = 14, conflicts_with_all = ["from", "to"])]
    pub days: u32,

    /// Today only
    #[arg(long, conflicts_with_all = ["from", "to", "days"])]
    pub today: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// starter, pro or agency
    pub plan: CheckoutPlan,
}

#[derive(Args, Debug)]
pub struct RecoverArgs {
    pub email: String,
}

#[derive(Args, Debug)]
pub struct RecoverRotateArgs {
    /// Token from the recovery e-mail
    pub token: String,
}

// ==================== TOOLS ====================

#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub cmd: ToolsCmd,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCmd {
    /// List tools in a scope
    List(ScopeArg),
    /// Show one tool
    Get(ToolRef),
    /// Create or replace a tool
    Upsert(ToolUpsertArgs),
    /// Enable or disable a tool
    Toggle(ToolToggleArgs),
    /// Delete a tool
    Delete(ToolRef),
}

#[derive(Args, Debug)]
pub struct ScopeArg {
    /// Scope id (default: global)
    #[arg(long)]
    pub scope: Option<String>,
}

#[derive(Args, Debug)]
pub struct ToolRef {
    pub name: String,

    #[command(flatten)]
    pub scope: ScopeArg,
}

#[derive(Args, Debug)]
pub struct ToolUpsertArgs {
    pub name: String,

    /// Webhook URL
    #[arg(long)]
    pub url: String,

    /// HMAC-SHA256 signing secret
    #[arg(long, env = "ONCEONLY_TOOL_SECRET", hide_env_values = true)]
    pub secret: String,

    #[command(flatten)]
    pub scope: ScopeArg,

    #[arg(long, default_value_t = 15_000)]
    pub timeout_ms: u64,

    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct ToolToggleArgs {
    pub name: String,

    pub state: Switch,

    #[command(flatten)]
    pub scope: ScopeArg,
}

// ==================== POLICY ====================

#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub cmd: PolicyCmd,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCmd {
    /// Show an agent's policy
    Get(AgentRef),
    /// List all policies
    List,
    /// Create or update an agent's policy
    Set(PolicySetArgs),
    /// Apply a server-side template
    Template(PolicyTemplateArgs),
}

#[derive(Args, Debug)]
pub struct AgentRef {
    pub agent_id: String,
}

#[derive(Args, Debug)]
pub struct PolicySetArgs {
    pub agent_id: String,

    /// Allowed tool names (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<String>,

    /// Blocked tool names (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub block: Vec<String>,

    /// 0 leaves the ceiling unset
    #[arg(long, default_value_t = 0)]
    pub max_actions_per_hour: u64,

    /// 0 leaves the ceiling unset
    #[arg(long, default_value_t = 0.0)]
    pub max_spend_usd_per_day: f64,
}

#[derive(Args, Debug)]
pub struct PolicyTemplateArgs {
    pub agent_id: String,

    /// strict, moderate, permissive, read_only or support_bot
    pub template: PolicyTemplate,

    /// JSON object merged over the template
    #[arg(long)]
    pub overrides: Option<String>,
}

// ==================== AGENT ====================

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub cmd: AgentCmd,
}

#[derive(Subcommand, Debug)]
pub enum AgentCmd {
    /// Kill switch: block every action of the agent
    Disable(AgentDisableArgs),
    /// Re-enable a disabled agent
    Enable(AgentRef),
    /// Recent audit log entries
    Logs(AgentLogsArgs),
    /// Aggregated action metrics
    Metrics(AgentMetricsArgs),
}

#[derive(Args, Debug)]
pub struct AgentDisableArgs {
    pub agent_id: String,

    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Args, Debug)]
pub struct AgentLogsArgs {
    pub agent_id: String,

    #[arg(long, default_value_t = onceonly_client::DEFAULT_AGENT_LOG_LIMIT)]
    pub limit: u32,
}

#[derive(Args, Debug)]
pub struct AgentMetricsArgs {
    pub agent_id: String,

    /// hour, day or week
    #[arg(long, default_value = "day")]
    pub period: MetricsPeriod,
}
