//! Unified error type for Rapidboard.

use rapidboard_board::BoardError;
use rapidboard_protocol::ProtocolError;
use rapidboard_runner::OperationError;
use rapidboard_service::ServiceError;
use rapidboard_session::{SessionError, StoreError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `rapidboard` meta-crate you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RapidboardError {
    /// A wire format error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The backend couldn't be set up.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A remote operation failed or the runner stopped.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The identity store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An identity-scoped call failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A board pipeline failed.
    #[error(transparent)]
    Board(#[from] BoardError),
}
