//! Async operation runner for Rapidboard.
//!
//! Every remote call Rapidboard makes goes through an [`OperationRunner`].
//! The runner owns a single host task that drives all outstanding calls;
//! callers hand it a call, suspend, and are resumed with exactly one
//! outcome once the response arrives.
//!
//! # Shape
//!
//! ```text
//! caller ──run(op, call)──► mpsc ──► host task (FuturesUnordered)
//!    ▲                                   │
//!    └──────── oneshot(response) ◄───────┘
//! ```
//!
//! The runner then looks at the response's success flag: a failed response
//! becomes [`OperationError::Remote`] carrying the backend's message
//! verbatim. No timeout, no retry.
//!
//! # Integration
//!
//! ```ignore
//! let runner = OperationRunner::spawn(RunnerConfig::default());
//! let service = Arc::clone(&service);
//! let list = runner
//!     .run("get_score_list", async move { service.get_score_list(&key, 3).await })
//!     .await?;
//! ```

mod config;
mod error;
mod runner;

pub use config::RunnerConfig;
pub use error::OperationError;
pub use runner::OperationRunner;

use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters for a runner, as read by [`OperationRunner::metrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerMetrics {
    /// Operations handed to the runner.
    pub issued: u64,
    /// Operations that resolved with a successful response.
    pub succeeded: u64,
    /// Operations that resolved with a failed response or never reached
    /// a response because the host stopped.
    pub failed: u64,
    /// Calls the host is currently driving.
    pub in_flight: u64,
}

/// Live counters shared by the handles and the host task.
#[derive(Debug, Default)]
pub(crate) struct MetricsCounters {
    issued: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
}

impl MetricsCounters {
    pub(crate) fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, success: bool) {
        let counter = if success { &self.succeeded } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn call_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Calls dropped unresolved when the host stops.
    pub(crate) fn calls_abandoned(&self, count: u64) {
        self.in_flight.fetch_sub(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RunnerMetrics {
        RunnerMetrics {
            issued: self.issued.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_recorded_counts() {
        let counters = MetricsCounters::default();
        counters.record_issued();
        counters.record_issued();
        counters.call_started();
        counters.call_started();
        counters.call_finished();
        counters.record_outcome(true);

        let m = counters.snapshot();

        assert_eq!(
            m,
            RunnerMetrics {
                issued: 2,
                succeeded: 1,
                failed: 0,
                in_flight: 1,
            }
        );
    }

    #[test]
    fn test_calls_abandoned_clears_in_flight() {
        let counters = MetricsCounters::default();
        counters.call_started();
        counters.call_started();

        counters.calls_abandoned(2);

        assert_eq!(counters.snapshot().in_flight, 0);
    }
}
