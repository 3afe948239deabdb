//! Per-leaderboard handle.

use std::sync::Arc;

use rapidboard_protocol::{
    LeaderboardKey, MemberRankResponse, ScoreListResponse, SubmitScoreResponse,
};
use rapidboard_service::LeaderboardService;
use rapidboard_session::{Identity, SessionError, SessionManager};

/// One remote leaderboard, bound to the session it is played through.
///
/// Cheap to clone. Any number of handles, for the same or different keys,
/// can share one session.
pub struct Leaderboard<S: LeaderboardService> {
    key: LeaderboardKey,
    session: Arc<SessionManager<S>>,
}

impl<S: LeaderboardService> Clone for Leaderboard<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: LeaderboardService> Leaderboard<S> {
    /// Binds `key` to `session`.
    pub fn new(key: impl Into<String>, session: Arc<SessionManager<S>>) -> Self {
        Self {
            key: LeaderboardKey::new(key),
            session,
        }
    }

    /// The leaderboard key.
    pub fn key(&self) -> &LeaderboardKey {
        &self.key
    }

    /// The session calls go through.
    pub fn session(&self) -> &Arc<SessionManager<S>> {
        &self.session
    }

    /// Submits `score` as the current guest.
    ///
    /// Waits for an in-flight bootstrap first.
    ///
    /// # Errors
    /// - [`SessionError::IdentityUnset`] if there is no guest identity.
    ///   Nothing is sent.
    /// - [`SessionError::Operation`] if the submission fails.
    pub async fn submit_score(&self, score: i64) -> Result<SubmitScoreResponse, SessionError> {
        let Identity::Member(member_id) = self.session.settled_identity().await else {
            return Err(SessionError::IdentityUnset);
        };
        self.session.submit_score(&member_id, score, &self.key).await
    }

    /// Fetches the top `count` rows.
    pub async fn get_score_list(&self, count: usize) -> Result<ScoreListResponse, SessionError> {
        self.session.get_score_list(&self.key, count).await
    }

    /// Fetches the current guest's row. See
    /// [`SessionManager::get_member_rank`].
    pub async fn get_member_rank(&self) -> Result<MemberRankResponse, SessionError> {
        self.session.get_member_rank(&self.key).await
    }
}
