//! Concurrent request tests
//!
//! Fires many requests at once and checks the registry lost no updates.

mod common;

use axum::http::StatusCode;
use common::{body_text, get, sample_sum};
use slowtask::handlers::{self, AppState};

#[tokio::test(start_paused = true)]
async fn test_hundred_concurrent_slow_requests_all_counted() {
    let app = handlers::router(AppState::new().unwrap());

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { get(&app, "/slow").await.status() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.expect("task should not panic"), StatusCode::OK);
    }

    let exposition = body_text(get(&app, "/metrics").await).await;
    assert_eq!(
        sample_sum(&exposition, "http_requests_total", &["route=\"/slow\""]),
        100.0
    );
    assert_eq!(
        sample_sum(
            &exposition,
            "http_request_duration_seconds_count",
            &["route=\"/slow\""]
        ),
        100.0
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_requests_do_not_block_each_other() {
    let app = handlers::router(AppState::new().unwrap());
    let start = tokio::time::Instant::now();

    let responses = futures::future::join_all((0..20).map(|_| get(&app, "/slow"))).await;
    assert!(responses.iter().all(|r| r.status() == StatusCode::OK));

    // Overlapped, the batch takes as long as its slowest task (3s at most).
    assert!(start.elapsed() <= std::time::Duration::from_millis(3_500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_routes_counted_under_multi_thread_runtime() {
    let state = AppState::new().unwrap();
    let app = handlers::router(state.clone());

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let app = app.clone();
            let uri = if i % 2 == 0 { "/" } else { "/nope" };
            tokio::spawn(async move { get(&app, uri).await.status() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let exposition = state.metrics().render().unwrap();
    assert_eq!(
        sample_sum(&exposition, "http_requests_total", &["route=\"/\""]),
        100.0
    );
    assert_eq!(
        sample_sum(&exposition, "http_requests_total", &["route=\"/nope\""]),
        100.0
    );
}
