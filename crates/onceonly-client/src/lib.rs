//! Client side of the OnceOnly console.
//!
//! This crate provides:
//!
//! - A single-slot credential store (in-memory or file backed)
//! - An authenticated HTTP client that talks to the console's same-origin
//!   proxy and classifies failures into a small error taxonomy
//! - Typed wrappers for account, usage, events, metrics, billing and
//!   governance endpoints
//! - Polling subscriptions that keep `{data, loading, error}` state for a
//!   resource and never mutate it after teardown
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use onceonly_client::{ApiClient, ClientConfig, MemoryStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let client = ApiClient::new(ClientConfig::from_env(), store)?;
//!
//! let me = client.login("oo_live_0123456789").await?;
//! println!("plan: {}", me.plan);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ONCEONLY_CONSOLE_URL` | Console origin (default: `http://127.0.0.1:3000`) |
//! | `ONCEONLY_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod client;
pub mod credentials;
pub mod date;
pub mod error;
pub mod governance;
pub mod types;
pub mod watch;

// Re-export main types
pub use client::{ApiClient, CLIENT_USER_AGENT, PROXY_PREFIX};
pub use credentials::{CredentialStore, FileStore, MemoryStore, STORAGE_KEY};
pub use date::{add_days, to_iso_date, DayRange};
pub use error::{ApiError, ClientError, ClientResult, ErrorCode};
pub use governance::DEFAULT_AGENT_LOG_LIMIT;
pub use types::{
    AccountInfo, AgentMetrics, AgentStatus, CheckoutPlan, ClientConfig, EventRecord,
    EventTimestamp, MetricsPeriod, MetricsRow, Policy, PolicyRules, PolicyTemplate, PolicyUpsert,
    Tool, ToolAuth, ToolDeleted, ToolToggled, ToolUpsert, Usage, UsageCategory, UsageSnapshot,
};
pub use watch::{
    event_key, merge_events, EventFeed, Query, ResourceState, Subscription,
    DEFAULT_EVENTS_INTERVAL,
};
