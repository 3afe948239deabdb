//! Leaderboard handles and ordered refresh pipelines for Rapidboard.
//!
//! - [`Leaderboard`]: one remote leaderboard, keyed, played through a
//!   shared [`SessionManager`](rapidboard_session::SessionManager).
//! - [`BoardHandler`]: the pipelines a leaderboard UI runs
//!   (submit-then-refresh, others-then-self refresh) and the
//!   [`BoardView`] they keep up to date.
//!
//! # Example
//!
//! ```ignore
//! let board = BoardHandler::new(
//!     Leaderboard::new("weekly", Arc::clone(&session)),
//!     DisplayWindow::new(5),
//!     BoardConfig::default(),
//! );
//! board.submit_and_refresh_with("ada", 120).await?;
//! for row in board.view().window.rows() {
//!     println!("{} {} {}", row.rank, row.name, row.score);
//! }
//! ```

mod config;
mod error;
mod handler;
mod leaderboard;
mod view;

pub use config::{BoardConfig, ERROR_PLACEHOLDER};
pub use error::BoardError;
pub use handler::{BoardHandler, ScoreProvider};
pub use leaderboard::Leaderboard;
pub use view::{BoardStatus, BoardView, DisplayWindow, SessionSlot, SlotText};
