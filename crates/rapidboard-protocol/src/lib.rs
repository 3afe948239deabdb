//! Wire protocol for Rapidboard.
//!
//! This crate defines the "language" spoken with the remote leaderboard
//! backend:
//!
//! - **Types** ([`MemberId`], [`LeaderboardKey`], the `*Response` structs,
//!   [`ScoreEntry`]): what the backend returns for each call.
//! - **[`RemoteResponse`]**: the uniform "did it work, and if not why"
//!   view every response offers to the operation runner.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how values are converted
//!   to/from bytes (HTTP bodies, the persisted identity file).
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Service (HTTP bytes) → Protocol (typed responses) → Runner (success/failure)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    GuestSessionResponse, LeaderboardKey, MemberId, MemberRankResponse,
    PlayerInfo, PlayerNameResponse, RemoteResponse, ScoreEntry, ScoreItem,
    ScoreListResponse, SubmitScoreResponse,
};
