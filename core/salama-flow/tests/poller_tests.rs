mod common;

use common::ScriptedApi;
use salama_flow::{PollConfig, PollOutcome, PollerHandle, StatusPoller};
use salama_types::{TransactionId, TransactionStatus};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;

// ── Resolution ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn resolves_once_the_server_reports_completed() {
    let api = Arc::new(ScriptedApi::new());
    api.push_status(TransactionStatus::Processing);
    api.push_completed("SJV74BTLC5");

    let started = Instant::now();
    let poller = StatusPoller::new(api.clone());
    let outcome = poller.run(&TransactionId::from("TXN-1"), None).await;

    let PollOutcome::Completed(confirmation) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(
        confirmation.mpesa_receipt.map(|c| c.as_str().to_string()),
        Some("SJV74BTLC5".to_string())
    );
    // First query fires immediately, the second 2.5s later; polling stops
    // right there.
    assert_eq!(started.elapsed(), Duration::from_millis(2500));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn times_out_after_the_full_window() {
    let api = Arc::new(ScriptedApi::new());

    let started = Instant::now();
    let poller = StatusPoller::new(api.clone());
    let outcome = poller.run(&TransactionId::from("TXN-2"), None).await;

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    // Queries at t = 0, 2.5, ..., 57.5; the deadline wins at t = 60.
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 24);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_do_not_end_the_run() {
    let api = Arc::new(ScriptedApi::new());
    api.push_transient();
    api.push_transient();
    api.push_completed("RKT19XWQ2M");

    let poller = StatusPoller::new(api.clone());
    let outcome = poller.run(&TransactionId::from("TXN-3"), None).await;

    assert!(matches!(outcome, PollOutcome::Completed(_)));
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_status_keeps_polling_until_the_deadline() {
    let api = Arc::new(ScriptedApi::new());
    api.push_status(TransactionStatus::Failed);

    let poller = StatusPoller::new(api.clone());
    let outcome = poller.run(&TransactionId::from("TXN-4"), None).await;

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 24);
}

// ── Cancellation ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_cancels_both_timers_and_is_idempotent() {
    let api = Arc::new(ScriptedApi::new());
    let handle = PollerHandle::spawn(
        api.clone(),
        PollConfig::default(),
        TransactionId::from("TXN-5"),
        None,
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    handle.stop();
    handle.stop();
    assert_eq!(handle.outcome().await, None);

    let calls = api.status_calls.load(Ordering::SeqCst);
    assert!(calls >= 1, "poller never queried before stop");
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(
        api.status_calls.load(Ordering::SeqCst),
        calls,
        "queries continued after stop"
    );
}
