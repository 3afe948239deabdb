//! Guest identity and identity-scoped leaderboard calls for Rapidboard.
//!
//! This crate is the single source of truth for "who are we":
//!
//! 1. **Bootstrap**: start one anonymous guest session per manager
//!    ([`SessionManager::initialize`]) and persist its member id.
//! 2. **Identity**: read it back ([`SessionManager::player_id`],
//!    [`Identity`]), optionally waiting for the bootstrap to settle.
//! 3. **Calls**: set the display name, submit scores, list scores and
//!    fetch the guest's own rank, all through one
//!    [`OperationRunner`](rapidboard_runner::OperationRunner).
//!
//! # How it fits in the stack
//!
//! ```text
//! Board Layer (above)    ← per-leaderboard handles and refresh pipelines
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Runner / Service (below) ← async hosting and the remote backend
//! ```

mod error;
mod manager;
mod session;
mod store;

pub use error::{SessionError, StoreError};
pub use manager::SessionManager;
pub use session::{BootstrapState, Identity, SessionConfig};
pub use store::{IdentityStore, JsonFileStore, MemoryStore};
