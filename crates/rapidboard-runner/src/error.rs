//! Error types for the runner.

/// The failure side of a [`run`](crate::OperationRunner::run).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The backend answered and reported failure. `message` is its error
    /// text, unmodified.
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// The runner host stopped before this operation resolved.
    #[error("{operation} was not completed: runner host stopped")]
    HostStopped { operation: &'static str },
}

impl OperationError {
    /// Name of the operation that failed, e.g. `"submit_score"`.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Remote { operation, .. } | Self::HostStopped { operation } => operation,
        }
    }

    /// The raw failure text: the backend's message for remote failures.
    pub fn message(&self) -> &str {
        match self {
            Self::Remote { message, .. } => message,
            Self::HostStopped { .. } => "runner host stopped",
        }
    }
}
