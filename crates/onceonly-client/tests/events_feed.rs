//! Integration tests for subscriptions against a mock proxy and "load more" paging.

use std::sync::Arc;
use std::time::Duration;

use onceonly_client::watch::{watch_account, watch_events, watch_metrics};
use onceonly_client::{
    event_key, ApiClient, ClientConfig, DayRange, ErrorCode, EventFeed, EventRecord,
    MemoryStore,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> ApiClient {
    let config = ClientConfig::default().with_console_url(mock_server.uri());
    ApiClient::new(config, Arc::new(MemoryStore::with_token("oo_live_test")))
        .expect("failed to create client")
}

fn page(start: usize, len: usize) -> serde_json::Value {
    let events: Vec<_> = (start..start + len)
        .map(|i| {
            json!({
                "type": "locked",
                "ts": 1_760_000_000 - i as i64,
                "req_id": format!("r{}", i)
            })
        })
        .collect();
    json!(events)
}

#[tokio::test]
async fn test_full_page_keeps_has_more_then_short_page_stops() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(50, 50)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(100, 30)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let base: Vec<EventRecord> = serde_json::from_value(page(0, 50)).unwrap();
    let mut feed = EventFeed::new(client, 50);

    assert_eq!(feed.load_more(base.len()).await.unwrap(), 50);
    assert!(feed.has_more());

    assert_eq!(feed.load_more(base.len()).await.unwrap(), 30);
    assert!(!feed.has_more());

    // Exhausted: no request is made (the mocks above expect exactly one call each).
    assert_eq!(feed.load_more(base.len()).await.unwrap(), 0);

    let merged = feed.merged(&base);
    assert_eq!(merged.len(), 130);
}

#[tokio::test]
async fn test_overlapping_page_is_deduplicated() {
    let mock_server = MockServer::start().await;

    // A new event arrived upstream, shifting the window by one.
    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .and(query_param("offset", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 3)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let base: Vec<EventRecord> = serde_json::from_value(page(0, 3)).unwrap();
    let mut feed = EventFeed::new(client, 3);

    feed.load_more(base.len()).await.unwrap();
    let merged = feed.merged(&base);

    let keys: Vec<_> = merged.iter().map(event_key).collect();
    assert_eq!(keys, vec!["req:r0", "req:r1", "req:r2", "req:r3", "req:r4"]);
}

#[tokio::test]
async fn test_short_base_page_skips_load_more() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(30, 50)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let base: Vec<EventRecord> = serde_json::from_value(page(0, 30)).unwrap();
    let mut feed = EventFeed::new(client, 50);

    assert_eq!(feed.load_more(base.len()).await.unwrap(), 0);
    assert!(!feed.has_more());
    assert_eq!(feed.merged(&base).len(), 30);

    feed.reset(50);
    assert!(feed.has_more());
}

#[tokio::test]
async fn test_failed_page_keeps_feed_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let mut feed = EventFeed::new(client, 50);

    let err = feed.load_more(50).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimited);
    assert!(feed.has_more());
    assert!(feed.loaded().is_empty());
}

#[tokio::test]
async fn test_events_subscription_fetches_and_polls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 5)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let mut sub = watch_events(&client, 5, Duration::from_millis(50));

    while sub.state().loading {
        assert!(sub.changed().await);
    }
    let state = sub.state();
    assert_eq!(state.data.as_ref().map(Vec::len), Some(5));
    assert!(state.error.is_none());

    // Wait for at least one poll tick to hit the server again.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.len() >= 2, "expected polling, got {} requests", requests.len());

    sub.cancel();
    let after_cancel = mock_server.received_requests().await.unwrap_or_default().len();
    tokio::time::sleep(Duration::from_millis(200)).await;
    let later = mock_server.received_requests().await.unwrap_or_default().len();
    assert!(later <= after_cancel + 1);
}

#[tokio::test]
async fn test_account_subscription_reports_auth_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let mut sub = watch_account(&client);

    while sub.state().loading {
        assert!(sub.changed().await);
    }
    let state = sub.state();
    assert!(state.data.is_none());
    assert_eq!(
        state.error.as_ref().map(|e| e.code()),
        Some(ErrorCode::Unauthorized)
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_metrics_subscription_refetches_on_new_range() {
    let mock_server = MockServer::start().await;
    let day = |d| chrono::NaiveDate::from_ymd_opt(2026, 10, d).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/metrics"))
        .and(query_param("from_day", "2026-10-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"day": "2026-10-03", "checks_total": 3}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/metrics"))
        .and(query_param("from_day", "2026-10-16"))
        .and(query_param("to_day", "2026-10-16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"day": "2026-10-16", "checks_total": 9}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let mut sub = watch_metrics(&client, DayRange::new(day(3), day(16)));

    while sub.state().loading {
        assert!(sub.changed().await);
    }
    assert_eq!(sub.state().data.unwrap()[0].checks_total, 3);

    // Same range again: no second request.
    sub.set_params(DayRange::new(day(3), day(16)));
    sub.set_params(DayRange::new(day(16), day(16)));
    loop {
        let state = sub.state();
        if !state.loading && state.data.as_ref().map(|rows| rows[0].checks_total) == Some(9) {
            break;
        }
        assert!(sub.changed().await);
    }
    assert!(sub.state().error.is_none());
    sub.cancel();
}
