use super::*;
use crate::memory_store::MemoryJobStore;
use crate::testing::MockStore;
use hookcron_protocols::{JobSpec, JobStatus, StoreError};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory(store: Arc<dyn JobStore>) -> HttpActionFactory {
    let config = DispatchConfig {
        timeout: Duration::from_secs(5),
        ..DispatchConfig::default()
    };
    HttpActionFactory::new(&config, store).unwrap()
}

fn job(trigger_type: &str, http_method: &str, url: String) -> JobDefinition {
    JobDefinition::new(
        JobSpec::new("hook", trigger_type, "60", http_method, url),
        None,
    )
}

#[tokio::test]
async fn test_post_sends_body_token_and_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(query_param("source", "cron"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", DISPATCH_CONTENT_TYPE))
        .and(body_string("{\"ping\":true}"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let job = JobDefinition::new(
        JobSpec::new(
            "hook",
            "interval",
            "60",
            "POST",
            format!("{}/hook?source=cron", mock_server.uri()),
        )
        .with_body("{\"ping\":true}")
        .with_token("secret-token"),
        None,
    );

    let action = factory(store).build(&job);
    assert_eq!(action.key(), job.id);
    assert_eq!(action.execute().await.unwrap(), 202);
}

#[tokio::test]
async fn test_no_authorization_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let job = job("cron", "GET", format!("{}/status", mock_server.uri()));
    assert_eq!(factory(store).build(&job).execute().await.unwrap(), 200);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_error_status_is_reported_not_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/resource/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let job = job("interval", "DELETE", format!("{}/resource/1", mock_server.uri()));
    assert_eq!(factory(store).build(&job).execute().await.unwrap(), 503);
}

#[tokio::test]
async fn test_transport_error_fails_the_firing() {
    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    // Port 9 (discard) on loopback is not listening in test environments.
    let job = job("interval", "PUT", "http://127.0.0.1:9/unreachable".to_string());

    let err = factory(store).build(&job).execute().await.unwrap_err();
    assert!(matches!(err, ActionError::Transport(_)));
}

#[tokio::test]
async fn test_invalid_target_fails_the_firing() {
    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());

    let err = factory(store.clone())
        .build(&job("interval", "GET", "not a url".to_string()))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidTarget(_)));

    let err = factory(store)
        .build(&job("interval", "GET", "ftp://example.com/file".to_string()))
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidTarget(ref m) if m.contains("ftp")));
}

#[tokio::test]
async fn test_once_marks_done_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/once"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryJobStore::new());
    let mut job = job("once", "POST", format!("{}/once", mock_server.uri()));
    job.live_handle = Some(hookcron_protocols::JobHandle::new(11));
    store.insert(&job).await.unwrap();

    let action = factory(store.clone()).build(&job);
    assert_eq!(action.execute().await.unwrap(), 200);

    let stored = store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Done);
    assert!(stored.live_handle.is_none());
}

#[tokio::test]
async fn test_once_aborts_when_status_write_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut store = MockStore::new();
    store
        .expect_mark_done()
        .times(1)
        .returning(|_| Err(StoreError::Database("database is locked".to_string())));

    let job = job("once", "POST", format!("{}/once", mock_server.uri()));
    let err = factory(Arc::new(store)).build(&job).execute().await.unwrap_err();
    assert!(matches!(err, ActionError::Precondition(ref m) if m.contains("locked")));
}

#[tokio::test]
async fn test_recurring_jobs_never_touch_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    // No expectations: any store call panics.
    let store = MockStore::new();
    let job = job("cron", "GET", mock_server.uri());
    assert_eq!(factory(Arc::new(store)).build(&job).execute().await.unwrap(), 204);
}

#[test]
fn test_default_config() {
    let config = DispatchConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.user_agent.starts_with("hookcron/"));
}
