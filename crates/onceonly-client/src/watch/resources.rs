//! Subscriptions for the console's resources.

use std::time::Duration;

use crate::client::ApiClient;
use crate::date::DayRange;
use crate::types::{AccountInfo, EventRecord, MetricsRow, Policy, Tool, Usage, UsageSnapshot};

use super::Subscription;

pub fn watch_account(client: &ApiClient) -> Subscription<(), AccountInfo> {
    let client = client.clone();
    Subscription::spawn((), None, move |()| {
        let client = client.clone();
        async move { client.me().await }
    })
}

/// Legacy single-category usage.
pub fn watch_usage(client: &ApiClient) -> Subscription<(), Usage> {
    let client = client.clone();
    Subscription::spawn((), None, move |()| {
        let client = client.clone();
        async move { client.usage().await }
    })
}

pub fn watch_usage_all(client: &ApiClient) -> Subscription<(), UsageSnapshot> {
    let client = client.clone();
    Subscription::spawn((), None, move |()| {
        let client = client.clone();
        async move { client.usage_all().await }
    })
}

/// Latest `limit` events, re-polled every `interval`.
pub fn watch_events(
    client: &ApiClient,
    limit: u32,
    interval: Duration,
) -> Subscription<u32, Vec<EventRecord>> {
    let client = client.clone();
    Subscription::spawn(limit, Some(interval), move |limit| {
        let client = client.clone();
        async move { client.events(limit, None).await }
    })
}

pub fn watch_metrics(
    client: &ApiClient,
    range: DayRange,
) -> Subscription<DayRange, Vec<MetricsRow>> {
    let client = client.clone();
    Subscription::spawn(range, None, move |range| {
        let client = client.clone();
        async move { client.metrics(&range).await }
    })
}

/// Tools of one scope (`None` = global).
pub fn watch_tools(
    client: &ApiClient,
    scope_id: Option<String>,
) -> Subscription<Option<String>, Vec<Tool>> {
    let client = client.clone();
    Subscription::spawn(scope_id, None, move |scope_id| {
        let client = client.clone();
        async move { client.list_tools(scope_id.as_deref()).await }
    })
}

pub fn watch_policy(client: &ApiClient, agent_id: String) -> Subscription<String, Policy> {
    let client = client.clone();
    Subscription::spawn(agent_id, None, move |agent_id| {
        let client = client.clone();
        async move { client.get_policy(&agent_id).await }
    })
}
