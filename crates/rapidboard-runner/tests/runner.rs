//! Integration tests for the operation runner.
//!
//! The "remote" side is simulated with oneshot channels so each test
//! decides exactly when (and in which order) responses arrive.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rapidboard_protocol::{RemoteResponse, ScoreListResponse, SubmitScoreResponse};
use rapidboard_runner::{OperationError, OperationRunner, RunnerConfig, RunnerMetrics};
use tokio::sync::oneshot;

// =========================================================================
// Helpers
// =========================================================================

fn runner() -> OperationRunner {
    OperationRunner::spawn(RunnerConfig::default())
}

fn ok_submit(rank: u32) -> SubmitScoreResponse {
    SubmitScoreResponse {
        success: true,
        rank,
        ..SubmitScoreResponse::default()
    }
}

/// A remote call whose response the test supplies later.
fn deferred<R: RemoteResponse>() -> (oneshot::Sender<R>, impl Future<Output = R> + Send + 'static)
where
    R: Default,
{
    let (tx, rx) = oneshot::channel::<R>();
    (tx, async move { rx.await.unwrap_or_default() })
}

// =========================================================================
// run
// =========================================================================

#[tokio::test]
async fn test_run_successful_response_is_ok() {
    let runner = runner();

    let resp = runner
        .run("submit_score", async { ok_submit(3) })
        .await
        .unwrap();

    assert_eq!(resp.rank, 3);
}

#[tokio::test]
async fn test_run_failed_response_carries_message_verbatim() {
    let runner = runner();

    let err = runner
        .run("submit_score", async {
            SubmitScoreResponse::failed("rate limited")
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        OperationError::Remote {
            operation: "submit_score",
            message: "rate limited".into(),
        }
    );
}

#[tokio::test]
async fn test_run_concurrent_calls_resolve_in_response_order() {
    let runner = runner();
    let (first_tx, first_call) = deferred::<SubmitScoreResponse>();
    let (second_tx, second_call) = deferred::<SubmitScoreResponse>();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let first = {
        let runner = runner.clone();
        let order = Arc::clone(&order);
        tokio::spawn(async move {
            let resp = runner.run("first", first_call).await.unwrap();
            order.lock().unwrap().push(resp.rank);
        })
    };
    let second = {
        let runner = runner.clone();
        let order = Arc::clone(&order);
        tokio::spawn(async move {
            let resp = runner.run("second", second_call).await.unwrap();
            order.lock().unwrap().push(resp.rank);
        })
    };

    // Answer the second call first.
    tokio::time::sleep(Duration::from_millis(10)).await;
    second_tx.send(ok_submit(2)).unwrap();
    second.await.unwrap();
    first_tx.send(ok_submit(1)).unwrap();
    first.await.unwrap();

    assert_eq!(*order.lock().unwrap(), vec![2, 1]);
}

#[tokio::test]
async fn test_run_pending_call_does_not_block_others() {
    let runner = runner();
    let (_never_tx, never) = deferred::<ScoreListResponse>();

    let stuck = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run("stuck", never).await })
    };
    let quick = runner.run("quick", async { ok_submit(1) }).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(quick.is_ok());
    assert!(!stuck.is_finished());
    assert_eq!(runner.metrics().in_flight, 1);
}

// =========================================================================
// run_with
// =========================================================================

#[tokio::test]
async fn test_run_with_success_fires_only_success_continuation_once() {
    let runner = runner();
    let successes = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);

    runner
        .run_with(
            "submit_score",
            async { ok_submit(1) },
            |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            },
            |_| {
                failures.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(failures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_run_with_failure_fires_only_failure_continuation_once() {
    let runner = runner();
    let successes = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);

    runner
        .run_with(
            "submit_score",
            async { SubmitScoreResponse::failed("nope") },
            |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            },
            |e| {
                assert_eq!(e.message(), "nope");
                failures.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;

    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_with_returns_continuation_result() {
    let runner = runner();

    let label = runner
        .run_with(
            "submit_score",
            async { ok_submit(7) },
            |resp| format!("rank {}", resp.rank),
            |e| e.message().to_string(),
        )
        .await;

    assert_eq!(label, "rank 7");
}

// =========================================================================
// shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_resolves_pending_caller_with_host_stopped() {
    let runner = runner();
    let (_never_tx, never) = deferred::<SubmitScoreResponse>();

    let pending = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run("submit_score", never).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    runner.shutdown().await;
    let outcome = pending.await.unwrap();

    assert_eq!(
        outcome.unwrap_err(),
        OperationError::HostStopped {
            operation: "submit_score"
        }
    );
    assert!(!runner.is_running());
}

#[tokio::test]
async fn test_run_after_shutdown_never_polls_call() {
    let runner = runner();
    runner.shutdown().await;
    let polled = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&polled);
    let outcome = runner
        .run("get_score_list", async move {
            counter.fetch_add(1, Ordering::SeqCst);
            ScoreListResponse::default()
        })
        .await;

    assert!(matches!(outcome, Err(OperationError::HostStopped { .. })));
    assert_eq!(polled.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_shutdown_twice_is_harmless() {
    let runner = runner();
    runner.shutdown().await;
    runner.shutdown().await;
    assert!(!runner.is_running());
}

// =========================================================================
// metrics
// =========================================================================

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let runner = runner();

    runner.run("a", async { ok_submit(1) }).await.ok();
    runner
        .run("b", async { SubmitScoreResponse::failed("x") })
        .await
        .ok();

    // The host may not have observed the last completion yet.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        runner.metrics(),
        RunnerMetrics {
            issued: 2,
            succeeded: 1,
            failed: 1,
            in_flight: 0,
        }
    );
}
