//! Runner configuration.

use tracing::warn;

/// Configuration for an [`OperationRunner`](crate::OperationRunner).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Capacity of the channel between handles and the host task.
    ///
    /// When it is full, `run` waits for room before issuing (bounded
    /// backpressure). Calls already handed to the host don't count
    /// against it.
    pub queue_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

impl RunnerConfig {
    /// Upper bound for `queue_capacity`.
    pub const MAX_QUEUE_CAPACITY: usize = 4096;

    /// Creates a config with the given queue capacity.
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self { queue_capacity }
    }

    /// Clamps `queue_capacity` to `1..=MAX_QUEUE_CAPACITY`.
    ///
    /// Called by [`OperationRunner::spawn`](crate::OperationRunner::spawn).
    /// `tokio::sync::mpsc::channel` panics on 0, so 0 becomes 1.
    pub fn validated(mut self) -> Self {
        if self.queue_capacity == 0 {
            warn!("queue_capacity is 0, using 1");
            self.queue_capacity = 1;
        } else if self.queue_capacity > Self::MAX_QUEUE_CAPACITY {
            warn!(
                capacity = self.queue_capacity,
                max = Self::MAX_QUEUE_CAPACITY,
                "queue_capacity exceeds maximum, clamping"
            );
            self.queue_capacity = Self::MAX_QUEUE_CAPACITY;
        }
        self
    }
}
