//! The runner handle and its host task.
//!
//! The host is an actor: one Tokio task that owns the set of in-flight
//! calls and receives new ones through an mpsc channel. Each call is
//! wrapped so that, when it resolves, it sends its response to the waiting
//! caller over a oneshot channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use rapidboard_protocol::RemoteResponse;
use tokio::sync::{mpsc, oneshot};

use crate::{MetricsCounters, OperationError, RunnerConfig, RunnerMetrics};

/// A call wrapped to deliver its own response.
type HostedCall = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Commands sent from handles to the host task.
enum RunnerCommand {
    /// Start driving a call.
    Run {
        operation: &'static str,
        call: HostedCall,
    },

    /// Stop the host. In-flight calls are dropped unresolved.
    Shutdown,
}

// ---------------------------------------------------------------------------
// OperationRunner
// ---------------------------------------------------------------------------

/// Handle to a running operation host.
///
/// Cheap to clone: an `mpsc::Sender` plus the shared counters. Every clone
/// talks to the same host task.
#[derive(Clone)]
pub struct OperationRunner {
    sender: mpsc::Sender<RunnerCommand>,
    metrics: Arc<MetricsCounters>,
}

impl OperationRunner {
    /// Spawns the host task and returns a handle to it.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn(config: RunnerConfig) -> Self {
        let config = config.validated();
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let metrics = Arc::new(MetricsCounters::default());

        let host = RunnerHost {
            receiver,
            calls: FuturesUnordered::new(),
            metrics: Arc::clone(&metrics),
        };
        tokio::spawn(host.run());

        Self { sender, metrics }
    }

    /// Runs `call` on the host and waits for its outcome.
    ///
    /// Resolves exactly once:
    /// - `Ok(response)` when the response reports success;
    /// - [`OperationError::Remote`] with the response's error text when it
    ///   reports failure;
    /// - [`OperationError::HostStopped`] when the host stopped before the
    ///   response arrived. In that case `call` may never have been polled.
    pub async fn run<R, F>(&self, operation: &'static str, call: F) -> Result<R, OperationError>
    where
        R: RemoteResponse,
        F: Future<Output = R> + Send + 'static,
    {
        self.metrics.record_issued();

        let (reply_tx, reply_rx) = oneshot::channel();
        let hosted: HostedCall = Box::pin(async move {
            let response = call.await;
            // The caller may have gone away; nobody to tell.
            let _ = reply_tx.send(response);
        });

        let outcome = match self
            .sender
            .send(RunnerCommand::Run {
                operation,
                call: hosted,
            })
            .await
        {
            Ok(()) => reply_rx.await.map_err(|_| OperationError::HostStopped { operation }),
            Err(_) => Err(OperationError::HostStopped { operation }),
        };

        let outcome = outcome.and_then(|response| {
            if response.is_success() {
                Ok(response)
            } else {
                Err(OperationError::Remote {
                    operation,
                    message: response.error_message().to_string(),
                })
            }
        });

        self.metrics.record_outcome(outcome.is_ok());
        match &outcome {
            Ok(_) => tracing::debug!(operation, "operation succeeded"),
            Err(e) => tracing::debug!(operation, error = %e, "operation failed"),
        }
        outcome
    }

    /// Runs `call` and hands its outcome to exactly one continuation.
    ///
    /// `on_success` receives the successful response, `on_failure` the
    /// error. Both are required; a caller that doesn't care about failure
    /// says so with `|_| ()`. The chosen continuation has finished before
    /// this returns, and its result is returned.
    pub async fn run_with<R, F, T>(
        &self,
        operation: &'static str,
        call: F,
        on_success: impl FnOnce(R) -> T,
        on_failure: impl FnOnce(OperationError) -> T,
    ) -> T
    where
        R: RemoteResponse,
        F: Future<Output = R> + Send + 'static,
    {
        match self.run(operation, call).await {
            Ok(response) => on_success(response),
            Err(e) => on_failure(e),
        }
    }

    /// Current counters.
    pub fn metrics(&self) -> RunnerMetrics {
        self.metrics.snapshot()
    }

    /// `false` once the host task has stopped.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Stops the host and waits until it has exited.
    ///
    /// Callers still waiting on a response get
    /// [`OperationError::HostStopped`]; operations issued afterwards fail
    /// the same way without their call being polled. Idempotent.
    pub async fn shutdown(&self) {
        // A send error means the host is already gone.
        let _ = self.sender.send(RunnerCommand::Shutdown).await;
        self.sender.closed().await;
    }
}

// ---------------------------------------------------------------------------
// Host task
// ---------------------------------------------------------------------------

/// The host actor. Owns every in-flight call.
struct RunnerHost {
    receiver: mpsc::Receiver<RunnerCommand>,
    calls: FuturesUnordered<HostedCall>,
    metrics: Arc<MetricsCounters>,
}

impl RunnerHost {
    /// Drives calls and accepts new ones until shut down or every handle
    /// is dropped.
    async fn run(mut self) {
        tracing::info!("operation runner host started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(RunnerCommand::Run { operation, call }) => {
                        tracing::debug!(operation, in_flight = self.calls.len() + 1, "operation issued");
                        self.metrics.call_started();
                        self.calls.push(call);
                    }
                    Some(RunnerCommand::Shutdown) | None => break,
                },
                Some(()) = self.calls.next(), if !self.calls.is_empty() => {
                    self.metrics.call_finished();
                }
            }
        }

        let abandoned = self.calls.len();
        if abandoned > 0 {
            tracing::warn!(abandoned, "runner host stopping with calls in flight");
        }
        self.metrics.calls_abandoned(abandoned as u64);
        // Close first so no handle can queue behind the shutdown, then drop
        // what is queued; every dropped reply sender resolves its caller.
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}

        tracing::info!("operation runner host stopped");
    }
}
