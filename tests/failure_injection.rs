//! Failure injection tests: retries, backoff, timeouts, sign-out cleanup.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use backstop::backend::Filter;
use backstop::{CallOverrides, Credentials, OutcomeStatus};

mod common;

fn retrying(max_retries: u32, base_delay_ms: u64) -> CallOverrides {
    CallOverrides {
        cache: Some(false),
        max_retries: Some(max_retries),
        base_delay_ms: Some(base_delay_ms),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_retry_backoff_accounting() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_mock_backend(move |_| {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "Service Unavailable".to_string())
            } else {
                (200, json!([{"id": 1}]).to_string())
            }
        }
    })
    .await;

    let gateway = common::test_gateway(addr);
    let start = Instant::now();
    let outcome = gateway
        .read("lands", None, Filter::new(), retrying(3, 100))
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.retries, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Backoff before success: 100ms + 200ms.
    assert!(
        start.elapsed() >= Duration::from_millis(300),
        "Expected at least 300ms of backoff, got {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_retry_exhaustion_attempts_and_status() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_mock_backend(move |_| {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            (500, "Internal Server Error".to_string())
        }
    })
    .await;

    let gateway = common::test_gateway(addr);
    let outcome = gateway
        .read("lands", None, Filter::new(), retrying(3, 20))
        .await;

    assert_eq!(outcome.status, OutcomeStatus::RetryExhausted);
    assert_eq!(outcome.retries, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 4, "maxRetries=3 means 4 total attempts");
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn test_single_attempt_timeout_reported_as_timeout() {
    let addr = common::start_mock_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(400)).await;
        (200, json!([]).to_string())
    })
    .await;

    let gateway = common::test_gateway(addr);
    let outcome = gateway
        .read(
            "lands",
            None,
            Filter::new(),
            CallOverrides {
                cache: Some(false),
                enable_retry: Some(false),
                timeout_ms: Some(50),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Timeout);
    assert_eq!(outcome.retries, 0);
    assert!(outcome.error.as_deref().unwrap().contains("50 ms"));
}

#[tokio::test]
async fn test_timed_out_attempt_retries_like_any_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_mock_backend(move |_| {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                // First attempt outlives the per-attempt deadline.
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            (200, json!([{"id": 1}]).to_string())
        }
    })
    .await;

    let gateway = common::test_gateway(addr);
    let outcome = gateway
        .read(
            "lands",
            None,
            Filter::new(),
            CallOverrides {
                cache: Some(false),
                max_retries: Some(2),
                base_delay_ms: Some(20),
                timeout_ms: Some(100),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.retries, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sign_out_clears_local_state_despite_remote_failure() {
    let reads = Arc::new(AtomicU32::new(0));
    let r = reads.clone();
    let addr = common::start_mock_backend(move |req| {
        let r = r.clone();
        async move {
            match req.path.as_str() {
                "/auth/signin" => (
                    200,
                    json!({"status": "success", "data": {"access_token": "tok"}}).to_string(),
                ),
                "/auth/signout" => (
                    503,
                    json!({"status": "error", "error": "backend down"}).to_string(),
                ),
                _ => {
                    r.fetch_add(1, Ordering::SeqCst);
                    (200, json!([{"id": 1}]).to_string())
                }
            }
        }
    })
    .await;

    let gateway = common::test_gateway(addr);
    gateway
        .sign_in(
            Credentials {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            },
            CallOverrides::default(),
        )
        .await;

    // Warm the cache.
    gateway
        .read("lands", None, Filter::new(), CallOverrides::default())
        .await;
    gateway
        .read("lands", None, Filter::new(), CallOverrides::default())
        .await;
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    let outcome = gateway.sign_out(retrying(1, 20)).await;

    // The remote failure is reported, not thrown.
    assert_eq!(outcome.status, OutcomeStatus::RetryExhausted);
    // Local cleanup ran regardless.
    assert!(gateway.sessions().get().is_none());
    gateway
        .read("lands", None, Filter::new(), CallOverrides::default())
        .await;
    assert_eq!(reads.load(Ordering::SeqCst), 2, "Cache must be empty after sign-out");
}

#[tokio::test]
async fn test_abandoned_call_still_completes_and_records() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_mock_backend(move |_| {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                (503, "Service Unavailable".to_string())
            } else {
                (200, json!([{"id": 1}]).to_string())
            }
        }
    })
    .await;

    let gateway = common::test_gateway(addr);

    // Abandon the call while the pipeline is backing off.
    let fut = gateway.read("lands", None, Filter::new(), retrying(2, 100));
    let abandoned = tokio::time::timeout(Duration::from_millis(30), fut).await;
    assert!(abandoned.is_err(), "Call should still be mid-backoff");

    // The spawned pipeline keeps running to completion.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2, "Retry must run despite abandonment");

    let metrics = gateway.metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].status, OutcomeStatus::Success);
}

#[tokio::test]
async fn test_unreachable_backend_yields_error_envelope() {
    // Nothing listens here; connections are refused immediately.
    let gateway = {
        let mut config = backstop::config::schema::BackstopConfig::default();
        config.backend.base_url = "http://127.0.0.1:1".to_string();
        config.defaults.log_requests = false;
        backstop::Gateway::new(config).unwrap()
    };

    let outcome = gateway
        .read(
            "lands",
            None,
            Filter::new(),
            CallOverrides {
                cache: Some(false),
                enable_retry: Some(false),
                ..Default::default()
            },
        )
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert!(outcome.data.is_none());
    assert!(outcome.error.is_some());
    assert!(!gateway.is_healthy().await);
}
