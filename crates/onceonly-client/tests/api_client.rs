//! Integration tests for ApiClient.
//!
//! Uses wiremock as the console proxy. Tests cover credential attachment,
//! status classification (401/402/429/5xx), body capture, forced logout and
//! the session flows (login, recovery, key rotation, checkout).

use std::sync::Arc;

use onceonly_client::{
    ApiClient, CheckoutPlan, ClientConfig, ClientError, CredentialStore, DayRange, ErrorCode,
    MemoryStore, CLIENT_USER_AGENT,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer, store: Arc<MemoryStore>) -> ApiClient {
    let config = ClientConfig::default().with_console_url(mock_server.uri());
    ApiClient::new(config, store).expect("failed to create client")
}

fn logged_in() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_token("oo_live_test"))
}

fn account_body() -> serde_json::Value {
    json!({
        "plan": "pro",
        "key_preview": "oo_live_…test",
        "is_active": true,
        "current_period_end": "2026-11-01T00:00:00Z",
        "total_requests": 1200,
        "total_blocked": 34
    })
}

#[tokio::test]
async fn test_me_sends_credential_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .and(header("authorization", "Bearer oo_live_test"))
        .and(header("accept", "application/json"))
        .and(header("cache-control", "no-cache"))
        .and(header("user-agent", CLIENT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let me = client.me().await.expect("me failed");

    assert_eq!(me.plan, "pro");
    assert!(me.is_active);
    assert_eq!(me.total_blocked, 34);
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Arc::new(MemoryStore::new()));
    let err = client.me().await.unwrap_err();

    assert_eq!(err.status(), 0);
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn test_402_is_payment_required_with_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/usage/all"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({"message": "plan inactive"})))
        .mount(&mock_server)
        .await;

    let store = logged_in();
    let client = create_test_client(&mock_server, store.clone());
    let err = client.usage_all().await.unwrap_err();

    assert_eq!(err.status(), 402);
    assert_eq!(err.code(), ErrorCode::PaymentRequired);
    let api = err.as_api().expect("expected API error");
    assert_eq!(api.body_message(), Some("plan inactive"));
    assert_eq!(api.message, "API error 402 on /v1/usage/all");

    // Only a 401 logs out.
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn test_429_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/usage"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let err = client.usage().await.unwrap_err();

    assert_eq!(err.status(), 429);
    assert_eq!(err.code(), ErrorCode::RateLimited);
}

#[tokio::test]
async fn test_5xx_is_unknown_with_text_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let err = client.me().await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unknown);
    let api = err.as_api().expect("expected API error");
    assert_eq!(api.body, Some(json!("upstream down")));
    assert_eq!(api.body_message(), None);
}

#[tokio::test]
async fn test_401_clears_stored_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad key"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in();
    let client = create_test_client(&mock_server, store.clone());

    let err = client.me().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(store.get(), None);

    // Subsequent reads are refused locally.
    let err = client.me().await.unwrap_err();
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn test_login_stores_key_and_verifies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .and(header("authorization", "Bearer oo_live_new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = create_test_client(&mock_server, store.clone());

    let me = client.login("  oo_live_new  ").await.expect("login failed");
    assert_eq!(me.plan, "pro");
    assert_eq!(store.get().as_deref(), Some("oo_live_new"));

    client.logout().expect("logout failed");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_with_rejected_key_leaves_store_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = create_test_client(&mock_server, store.clone());

    let err = client.login("oo_live_bad").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_events_query_and_paging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/events"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"type": "duplicate", "ts": 1_760_000_000, "key": "k1", "req_id": "r1"},
            {
                "type": "ai_failed",
                "ts": "2026-10-01T10:00:00Z",
                "lease_id": "l1",
                "error_code": "timeout"
            }
        ])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let events = client.events(50, Some(100)).await.expect("events failed");

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, "duplicate");
    assert!(events[1].is_ai());
    assert_eq!(events[1].error_code.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn test_metrics_uses_day_range() {
    let mock_server = MockServer::start().await;
    let range = DayRange::new(
        chrono::NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
    );

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/metrics"))
        .and(query_param("from_day", "2026-10-10"))
        .and(query_param("to_day", "2026-10-16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "day": "2026-10-10",
                "checks_total": 5,
                "duplicates_blocked": 1,
                "locks_created": 4,
                "rate_limited": 0
            }
        ])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let rows = client.metrics(&range).await.expect("metrics failed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].locks_created, 4);
}

#[tokio::test]
async fn test_unexpected_success_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let err = client.me().await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_checkout_url_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/billing/checkout-url"))
        .and(query_param("plan", "starter"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"url": "https://pay.example/s/abc"})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let url = client
        .checkout_url(CheckoutPlan::Starter)
        .await
        .expect("checkout failed");

    assert_eq!(url, "https://pay.example/s/abc");
}

#[tokio::test]
async fn test_checkout_without_url_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/proxy/v1/billing/checkout-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": ""})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    let err = client.checkout_url(CheckoutPlan::Pro).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_recovery_is_sent_anonymously() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/proxy/v1/recover"))
        .and(body_json(json!({"email": "ops@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Arc::new(MemoryStore::new()));
    client
        .request_recovery(" ops@example.com ")
        .await
        .expect("recovery failed");

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_post_attaches_credential_when_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/proxy/v1/recover"))
        .and(header_exists("authorization"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, logged_in());
    client
        .request_recovery("ops@example.com")
        .await
        .expect("recovery failed");
}

#[tokio::test]
async fn test_rotate_stores_new_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/proxy/v1/recover-rotate"))
        .and(body_json(json!({"token": "tok-123"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"api_key": "oo_live_rotated"})),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = create_test_client(&mock_server, store.clone());

    let key = client
        .rotate_recovered_key("tok-123")
        .await
        .expect("rotate failed");

    assert_eq!(key, "oo_live_rotated");
    assert_eq!(store.get().as_deref(), Some("oo_live_rotated"));
}

#[tokio::test]
async fn test_rotate_without_key_keeps_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/proxy/v1/recover-rotate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let store = logged_in();
    let client = create_test_client(&mock_server, store.clone());

    let err = client.rotate_recovered_key("tok-123").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
    assert_eq!(store.get().as_deref(), Some("oo_live_test"));
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::default()
        .with_console_url(format!("http://127.0.0.1:{}", port))
        .with_timeout_secs(2);
    let client = ApiClient::new(config, logged_in()).unwrap();

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
    assert_eq!(err.status(), 0);
    assert_eq!(err.code(), ErrorCode::Unknown);
}

#[tokio::test]
async fn test_401_on_post_clears_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/proxy/v1/tools/refund/toggle"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = logged_in();
    let client = create_test_client(&mock_server, Arc::clone(&store));
    let err = client
        .post::<_, serde_json::Value>("/v1/tools/refund/toggle", &json!({"enabled": false}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_401_on_delete_clears_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/proxy/v1/tools/refund"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = logged_in();
    let client = create_test_client(&mock_server, Arc::clone(&store));
    let err = client
        .delete::<serde_json::Value>("/v1/tools/refund")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert!(!store.is_authenticated());

    // Next call is refused locally.
    let err = client.me().await.unwrap_err();
    assert_eq!(err.status(), 0);
}
