//! Fetcher behavior against a mocked upstream.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use copilot_core::{FailureReason, Recorder};
use copilot_fetch::{FetchError, Fetcher, FetcherConfig, FreshnessCache, MetricsScope};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every event for later assertions.
#[derive(Default)]
struct Events {
    attempted: AtomicUsize,
    failures: Mutex<Vec<FailureReason>>,
}

impl Events {
    fn failures(&self) -> Vec<FailureReason> {
        self.failures.lock().unwrap().clone()
    }
}

impl Recorder for Events {
    fn upstream_attempted(&self) {
        self.attempted.fetch_add(1, Ordering::SeqCst);
    }

    fn upstream_failed(&self, reason: FailureReason) {
        self.failures.lock().unwrap().push(reason);
    }
}

fn fetcher_for(server: &MockServer, timeout: Duration) -> (Fetcher, Arc<Events>) {
    let events = Arc::new(Events::default());
    let config = FetcherConfig {
        api_base: server.uri(),
        scope: MetricsScope::Enterprise,
        timeout,
    };
    let fetcher = Fetcher::new(config, events.clone()).unwrap();
    (fetcher, events)
}

const METRICS_PATH: &str = "/enterprises/acme/copilot/metrics";

#[tokio::test]
async fn success_returns_latest_entry_with_org() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(METRICS_PATH))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": "2024-06-23", "total_active_users": 10 },
            { "date": "2024-06-24", "total_active_users": 20 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();

    assert_eq!(snapshot.total_active_users, Some(20.0));
    assert_eq!(snapshot.date.as_deref(), Some("2024-06-24"));
    assert_eq!(snapshot.org, "acme");
    assert_eq!(events.attempted.load(Ordering::SeqCst), 1);
    assert!(events.failures().is_empty());
}

#[tokio::test]
async fn server_error_degrades_to_empty_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(METRICS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.org, "acme");
    assert_eq!(events.failures(), vec![FailureReason::Status(500)]);
    assert_eq!(events.failures()[0].label(), "500");
}

#[tokio::test]
async fn unauthorized_is_classified_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let snapshot = fetcher.fetch("expired", "acme").await.unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(events.failures(), vec![FailureReason::Status(401)]);
}

#[tokio::test]
async fn timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "total_active_users": 1 }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_millis(100));
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(events.failures(), vec![FailureReason::Transport]);
    assert_eq!(events.failures()[0].label(), "request_exception");
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    let events = Arc::new(Events::default());
    let config = FetcherConfig {
        // Nothing listens on port 1.
        api_base: "http://127.0.0.1:1".to_string(),
        scope: MetricsScope::Enterprise,
        timeout: Duration::from_millis(500),
    };
    let fetcher = Fetcher::new(config, events.clone()).unwrap();

    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(events.failures(), vec![FailureReason::Transport]);
}

#[tokio::test]
async fn invalid_json_reports_observed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(events.failures(), vec![FailureReason::Status(200)]);
}

#[tokio::test]
async fn empty_list_reports_observed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(events.failures(), vec![FailureReason::Status(200)]);
}

#[tokio::test]
async fn missing_credential_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let err = fetcher.fetch("", "acme").await.unwrap_err();

    assert!(matches!(err, FetchError::Config(_)));
    assert!(err.to_string().contains("GHC_TOKEN"));
    assert_eq!(events.attempted.load(Ordering::SeqCst), 1);
    assert_eq!(events.failures(), vec![FailureReason::ConfigMissing]);
}

#[tokio::test]
async fn organization_scope_uses_orgs_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/copilot/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_engaged_users": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetcherConfig {
        api_base: server.uri(),
        scope: MetricsScope::Organization,
        timeout: Duration::from_secs(5),
    };
    let fetcher = Fetcher::new(config, Arc::new(Events::default())).unwrap();
    let snapshot = fetcher.fetch("secret", "acme").await.unwrap();
    assert_eq!(snapshot.total_engaged_users, Some(4.0));
}

#[tokio::test]
async fn cache_in_front_of_fetcher_hits_upstream_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(METRICS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_active_users": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, events) = fetcher_for(&server, Duration::from_secs(5));
    let cache = FreshnessCache::new(events.clone());
    let ttl = Duration::from_secs(3600);
    let t0 = Instant::now();

    for offset in [0, 10, 3599] {
        let snapshot = cache
            .get_or_refresh(t0 + Duration::from_secs(offset), ttl, || {
                fetcher.fetch("secret", "acme")
            })
            .await
            .unwrap();
        assert_eq!(snapshot.total_active_users, Some(5.0));
    }
    assert_eq!(events.attempted.load(Ordering::SeqCst), 1);
}
