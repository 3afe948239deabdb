//! Remote leaderboard service abstraction for Rapidboard.
//!
//! Provides the [`LeaderboardService`] trait: the five remote calls the rest
//! of Rapidboard is built on. Every call resolves to a typed response that
//! says whether it worked; transport problems are folded into that same
//! response, so callers have exactly one failure channel to look at.
//!
//! # Backends
//!
//! - [`HttpLeaderboardService`] (feature `http`, default): a
//!   LootLocker-style HTTP API via `reqwest`.
//! - [`MemoryLeaderboardService`]: an in-process leaderboard with a call
//!   log and fault injection, for development, demos and tests.

mod error;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use error::ServiceError;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpLeaderboardService};
pub use memory::{MemoryLeaderboardService, Operation, ServiceCall};

use std::future::Future;

use rapidboard_protocol::{
    GuestSessionResponse, LeaderboardKey, MemberId, MemberRankResponse,
    PlayerNameResponse, ScoreListResponse, SubmitScoreResponse,
};

/// The remote leaderboard backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one service instance is shared (behind an
///   `Arc`) by the session manager and the operation runner's host task.
/// - Every returned future is `Send` so the runner can drive it on the
///   Tokio runtime.
///
/// Implementations must resolve every call exactly once, with
/// `success == false` and a human-readable `error` on any failure.
pub trait LeaderboardService: Send + Sync + 'static {
    /// Starts (or resumes) an anonymous guest session.
    fn start_guest_session(
        &self,
    ) -> impl Future<Output = GuestSessionResponse> + Send;

    /// Sets the display name of the current session's player.
    fn set_player_name(
        &self,
        name: &str,
    ) -> impl Future<Output = PlayerNameResponse> + Send;

    /// Submits `score` for `member_id` to the leaderboard `key`.
    fn submit_score(
        &self,
        member_id: &MemberId,
        score: i64,
        key: &LeaderboardKey,
    ) -> impl Future<Output = SubmitScoreResponse> + Send;

    /// Fetches the top `count` rows of the leaderboard `key`.
    fn get_score_list(
        &self,
        key: &LeaderboardKey,
        count: usize,
    ) -> impl Future<Output = ScoreListResponse> + Send;

    /// Fetches `member_id`'s row on the leaderboard `key`.
    fn get_member_rank(
        &self,
        key: &LeaderboardKey,
        member_id: &MemberId,
    ) -> impl Future<Output = MemberRankResponse> + Send;
}
