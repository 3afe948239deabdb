//! Error types for the session layer.

use rapidboard_runner::OperationError;

/// Errors from identity-scoped leaderboard calls.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The call needs the guest identity and there is none: the bootstrap
    /// never ran or it failed. Detected locally; nothing was sent.
    #[error("no guest identity: the guest session was not established")]
    IdentityUnset,

    /// The remote call failed. Carries the backend's message unmodified.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl SessionError {
    /// The raw failure text, suitable for showing to the player.
    ///
    /// For remote failures this is the backend's own message.
    pub fn message(&self) -> String {
        match self {
            Self::IdentityUnset => self.to_string(),
            Self::Operation(e) => e.message().to_string(),
        }
    }
}

/// Errors from an [`IdentityStore`](crate::IdentityStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("identity store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file isn't a JSON object of strings.
    #[error("identity store is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}
