//! # Rapidboard
//!
//! Guest sessions and leaderboards for games, over a LootLocker-style
//! leaderboard API.
//!
//! Rapidboard establishes one anonymous guest identity per process,
//! lets it set a display name and submit scores, and keeps a plain-data
//! board view up to date through strictly ordered pipelines:
//!
//! ```text
//! submit_and_refresh:  set name ──→ submit score ──→ refresh
//! refresh:             top N ──→ own rank
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rapidboard::prelude::*;
//!
//! # async fn run() -> Result<(), RapidboardError> {
//! let rapidboard = RapidboardBuilder::new()
//!     .store(JsonFileStore::open("identity.json")?)
//!     .http_config(HttpConfig::new("my-game-key"))
//!     .start_http()
//!     .await?;
//!
//! let board = rapidboard.board("weekly", DisplayWindow::new(5), BoardConfig::default());
//! board.submit_and_refresh_with("ada", 120).await?;
//! println!("{:?}", board.view().window.rows());
//!
//! rapidboard.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{Rapidboard, RapidboardBuilder, ensure_device_id};
pub use error::RapidboardError;

pub use rapidboard_board as board;
pub use rapidboard_protocol as protocol;
pub use rapidboard_runner as runner;
pub use rapidboard_service as service;
pub use rapidboard_session as session;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Does nothing
/// if a global subscriber is already set, so it is safe to call from
/// every test or binary entry point.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything needed to use Rapidboard, in one import.
pub mod prelude {
    pub use crate::{Rapidboard, RapidboardBuilder, RapidboardError, init_tracing};

    pub use rapidboard_board::{
        BoardConfig, BoardError, BoardHandler, BoardStatus, BoardView, DisplayWindow,
        Leaderboard, SessionSlot, SlotText,
    };
    pub use rapidboard_protocol::{LeaderboardKey, MemberId, RemoteResponse, ScoreEntry};
    pub use rapidboard_runner::{OperationError, RunnerConfig, RunnerMetrics};
    pub use rapidboard_service::{LeaderboardService, MemoryLeaderboardService, Operation};
    #[cfg(feature = "http")]
    pub use rapidboard_service::{HttpConfig, HttpLeaderboardService};
    pub use rapidboard_session::{
        BootstrapState, Identity, IdentityStore, JsonFileStore, MemoryStore, SessionConfig,
        SessionError, SessionManager,
    };
}
