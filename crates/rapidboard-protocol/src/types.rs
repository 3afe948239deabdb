//! Core protocol types for Rapidboard.
//!
//! Every type here describes something the remote leaderboard backend
//! sends back (or something we derive from it for display). The backend
//! is an external HTTP API, so the structs are lenient: every field has a
//! default, and unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier of a guest identity on the leaderboard backend.
/// Also known as the player id.
///
/// Newtype over `String` so it can't be confused with a leaderboard key
/// or a display name. Serializes as the bare string. Deserializes from
/// either a string or an integer, because the backend reports guest ids
/// as numbers while leaderboard members carry them as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    /// Wraps a raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty id, which means "no identity".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// String key selecting which remote leaderboard an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderboardKey(pub String);

impl LeaderboardKey {
    /// Wraps a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaderboardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RemoteResponse: the runner's view of a response
// ---------------------------------------------------------------------------

/// Uniform success/failure view over every backend response.
///
/// The operation runner only ever looks at these two things: whether the
/// call worked, and the raw error text when it didn't. The text is passed
/// through verbatim; nobody in Rapidboard classifies it.
pub trait RemoteResponse: Send + 'static {
    /// `true` when the backend accepted the call.
    fn is_success(&self) -> bool;

    /// The backend's error text. Empty on success.
    fn error_message(&self) -> &str;

    /// Marks a decoded body as a successful response.
    ///
    /// Bodies don't carry a success flag; the HTTP status does.
    fn succeeded(self) -> Self
    where
        Self: Sized;

    /// Builds a failed response carrying `message`.
    ///
    /// Services use this to report transport problems (connection refused,
    /// bad status, undecodable body) through the same channel as errors
    /// reported by the backend itself.
    fn failed(message: impl Into<String>) -> Self
    where
        Self: Sized;
}

macro_rules! remote_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RemoteResponse for $ty {
                fn is_success(&self) -> bool {
                    self.success
                }

                fn error_message(&self) -> &str {
                    &self.error
                }

                fn succeeded(self) -> Self {
                    Self {
                        success: true,
                        ..self
                    }
                }

                fn failed(message: impl Into<String>) -> Self {
                    Self {
                        success: false,
                        error: message.into(),
                        ..Self::default()
                    }
                }
            }
        )*
    };
}

remote_response!(
    GuestSessionResponse,
    PlayerNameResponse,
    SubmitScoreResponse,
    ScoreListResponse,
    MemberRankResponse,
);

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of starting a guest session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestSessionResponse {
    pub success: bool,
    /// The guest's identity. Persisted by the session manager.
    pub player_id: MemberId,
    /// Token authorizing later calls of this session.
    pub session_token: String,
    pub error: String,
}

/// Result of setting the display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerNameResponse {
    pub success: bool,
    pub name: String,
    pub error: String,
}

/// Result of a score submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitScoreResponse {
    pub success: bool,
    pub member_id: MemberId,
    pub rank: u32,
    pub score: i64,
    pub error: String,
}

/// The public part of a player's profile attached to leaderboard rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerInfo {
    pub name: String,
}

/// One row of a score list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreItem {
    pub member_id: MemberId,
    pub rank: u32,
    pub score: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub player: PlayerInfo,
}

impl ScoreItem {
    /// The display-ready view of this row.
    pub fn entry(&self) -> ScoreEntry {
        ScoreEntry {
            rank: self.rank,
            name: self.player.name.clone(),
            score: self.score,
        }
    }
}

/// Result of fetching the top of a leaderboard.
///
/// `items` come back already ordered by ascending rank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreListResponse {
    pub success: bool,
    pub items: Vec<ScoreItem>,
    pub error: String,
}

impl ScoreListResponse {
    /// Checks that `items` are in ascending rank order (ties allowed).
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] naming the first row that ranks
    /// above the one before it.
    pub fn check_order(&self) -> Result<(), ProtocolError> {
        for pair in self.items.windows(2) {
            if pair[1].rank < pair[0].rank {
                return Err(ProtocolError::InvalidMessage(format!(
                    "score list out of order: rank {} after rank {}",
                    pair[1].rank, pair[0].rank
                )));
            }
        }
        Ok(())
    }
}

/// Result of fetching one member's rank.
///
/// `player == None` means the member has no score on this leaderboard
/// yet. That is a successful response, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberRankResponse {
    pub success: bool,
    pub member_id: MemberId,
    pub rank: u32,
    pub score: i64,
    pub player: Option<PlayerInfo>,
    pub error: String,
}

impl MemberRankResponse {
    /// The caller's own row, or `None` when not ranked yet.
    pub fn entry(&self) -> Option<ScoreEntry> {
        self.player.as_ref().map(|player| ScoreEntry {
            rank: self.rank,
            name: player.name.clone(),
            score: self.score,
        })
    }
}

// ---------------------------------------------------------------------------
// ScoreEntry
// ---------------------------------------------------------------------------

/// A ranked row as shown to the player: `{ rank, name, score }`.
///
/// Transient: produced by a fetch and never persisted by Rapidboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub rank: u32,
    pub name: String,
    pub score: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
