//! In-process leaderboard backend.
//!
//! [`MemoryLeaderboardService`] behaves like the remote API (guest
//! sessions, names, best-score leaderboards, ranks) without a network. On
//! top of that it records every call it receives and can be told to fail
//! the next call of a given kind, or to answer a kind of call only after a
//! delay. That makes it the backend of choice for demos and for tests that
//! check which remote calls happened, in which order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rapidboard_protocol::{
    GuestSessionResponse, LeaderboardKey, MemberId, MemberRankResponse,
    PlayerInfo, PlayerNameResponse, RemoteResponse, ScoreItem,
    ScoreListResponse, SubmitScoreResponse,
};

use crate::LeaderboardService;

/// The five kinds of remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    StartGuestSession,
    SetPlayerName,
    SubmitScore,
    GetScoreList,
    GetMemberRank,
}

/// One recorded call, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    StartGuestSession,
    SetPlayerName {
        name: String,
    },
    SubmitScore {
        member_id: MemberId,
        score: i64,
        key: LeaderboardKey,
    },
    GetScoreList {
        key: LeaderboardKey,
        count: usize,
    },
    GetMemberRank {
        key: LeaderboardKey,
        member_id: MemberId,
    },
}

impl ServiceCall {
    /// Which kind of call this was.
    pub fn operation(&self) -> Operation {
        match self {
            Self::StartGuestSession => Operation::StartGuestSession,
            Self::SetPlayerName { .. } => Operation::SetPlayerName,
            Self::SubmitScore { .. } => Operation::SubmitScore,
            Self::GetScoreList { .. } => Operation::GetScoreList,
            Self::GetMemberRank { .. } => Operation::GetMemberRank,
        }
    }
}

/// A member's best score on one board. `seq` breaks ties: whoever
/// reached the score first ranks higher.
#[derive(Debug, Clone, Copy)]
struct BoardRecord {
    score: i64,
    seq: u64,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_player: u64,
    next_seq: u64,
    /// Guest id handed out by the next guest session, if pinned.
    pinned_guest: Option<MemberId>,
    session: Option<MemberId>,
    names: HashMap<MemberId, String>,
    boards: HashMap<LeaderboardKey, HashMap<MemberId, BoardRecord>>,
    calls: Vec<ServiceCall>,
    faults: HashMap<Operation, VecDeque<String>>,
    latency: HashMap<Operation, Duration>,
}

impl MemoryState {
    fn ranked(&self, key: &LeaderboardKey) -> Vec<ScoreItem> {
        let Some(board) = self.boards.get(key) else {
            return Vec::new();
        };

        let mut rows: Vec<(&MemberId, &BoardRecord)> = board.iter().collect();
        rows.sort_by(|a, b| b.1.score.cmp(&a.1.score).then(a.1.seq.cmp(&b.1.seq)));

        rows.into_iter()
            .enumerate()
            .map(|(i, (member_id, record))| ScoreItem {
                member_id: member_id.clone(),
                rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
                score: record.score,
                player: PlayerInfo {
                    name: self.names.get(member_id).cloned().unwrap_or_default(),
                },
            })
            .collect()
    }

    fn take_fault(&mut self, operation: Operation) -> Option<String> {
        self.faults.get_mut(&operation).and_then(VecDeque::pop_front)
    }
}

/// An in-memory [`LeaderboardService`] with call recording and fault
/// injection.
#[derive(Debug, Default)]
pub struct MemoryLeaderboardService {
    state: Mutex<MemoryState>,
}

impl MemoryLeaderboardService {
    /// Creates an empty backend. Guest ids are handed out as `"1"`, `"2"`, ...
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every guest session resolve to `member_id`, as if the device
    /// had played before.
    pub fn with_guest_id(self, member_id: impl Into<String>) -> Self {
        self.lock().pinned_guest = Some(MemberId::new(member_id));
        self
    }

    /// Makes the next call of kind `operation` fail with `message`.
    ///
    /// Calls queue up: two `fail_next` for the same operation fail the
    /// next two calls.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        self.lock()
            .faults
            .entry(operation)
            .or_default()
            .push_back(message.into());
    }

    /// Delays every answer to `operation` by `delay`.
    ///
    /// The call is recorded when it arrives; the answer is computed after
    /// the delay.
    pub fn set_latency(&self, operation: Operation, delay: Duration) {
        self.lock().latency.insert(operation, delay);
    }

    /// Puts a row on a board directly, bypassing sessions.
    pub fn seed_score(
        &self,
        key: &LeaderboardKey,
        member_id: impl Into<String>,
        name: impl Into<String>,
        score: i64,
    ) {
        let member_id = MemberId::new(member_id);
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.names.insert(member_id.clone(), name.into());
        state
            .boards
            .entry(key.clone())
            .or_default()
            .insert(member_id, BoardRecord { score, seq });
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// How many calls of kind `operation` were received.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// The display name currently stored for `member_id`.
    pub fn name_of(&self, member_id: &MemberId) -> Option<String> {
        self.lock().names.get(member_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `call` and returns the configured delay and pending fault.
    fn arrive(&self, call: ServiceCall) -> (Option<Duration>, Option<String>) {
        let operation = call.operation();
        let mut state = self.lock();
        state.calls.push(call);
        let fault = state.take_fault(operation);
        (state.latency.get(&operation).copied(), fault)
    }

    /// Records the call, waits out any latency, and reports an injected
    /// fault if one was queued.
    async fn enter<T: RemoteResponse>(&self, call: ServiceCall) -> Result<(), T> {
        let operation = call.operation();
        let (delay, fault) = self.arrive(call);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match fault {
            Some(message) => {
                tracing::debug!(?operation, %message, "injected failure");
                Err(T::failed(message))
            }
            None => Ok(()),
        }
    }
}

impl LeaderboardService for MemoryLeaderboardService {
    async fn start_guest_session(&self) -> GuestSessionResponse {
        if let Err(failed) = self.enter(ServiceCall::StartGuestSession).await {
            return failed;
        }

        let mut state = self.lock();
        let player_id = match state.pinned_guest.clone() {
            Some(id) => id,
            None => {
                state.next_player += 1;
                MemberId::new(state.next_player.to_string())
            }
        };
        state.session = Some(player_id.clone());

        GuestSessionResponse {
            success: true,
            session_token: format!("mem-{player_id}"),
            player_id,
            error: String::new(),
        }
    }

    async fn set_player_name(&self, name: &str) -> PlayerNameResponse {
        let call = ServiceCall::SetPlayerName {
            name: name.to_string(),
        };
        if let Err(failed) = self.enter(call).await {
            return failed;
        }

        let mut state = self.lock();
        let Some(player) = state.session.clone() else {
            return PlayerNameResponse::failed("no active session");
        };
        if name.trim().is_empty() {
            return PlayerNameResponse::failed("name must not be empty");
        }
        state.names.insert(player, name.to_string());

        PlayerNameResponse {
            success: true,
            name: name.to_string(),
            error: String::new(),
        }
    }

    async fn submit_score(
        &self,
        member_id: &MemberId,
        score: i64,
        key: &LeaderboardKey,
    ) -> SubmitScoreResponse {
        let call = ServiceCall::SubmitScore {
            member_id: member_id.clone(),
            score,
            key: key.clone(),
        };
        if let Err(failed) = self.enter(call).await {
            return failed;
        }

        let mut state = self.lock();
        if state.session.is_none() {
            return SubmitScoreResponse::failed("no active session");
        }
        if member_id.is_empty() {
            return SubmitScoreResponse::failed("member_id is required");
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let board = state.boards.entry(key.clone()).or_default();
        let improved = board
            .get(member_id)
            .is_none_or(|existing| score > existing.score);
        if improved {
            board.insert(member_id.clone(), BoardRecord { score, seq });
        }

        let ranked = state.ranked(key);
        let Some(row) = ranked.iter().find(|row| &row.member_id == member_id) else {
            return SubmitScoreResponse::failed("score was not recorded");
        };

        SubmitScoreResponse {
            success: true,
            member_id: member_id.clone(),
            rank: row.rank,
            score: row.score,
            error: String::new(),
        }
    }

    async fn get_score_list(&self, key: &LeaderboardKey, count: usize) -> ScoreListResponse {
        let call = ServiceCall::GetScoreList {
            key: key.clone(),
            count,
        };
        if let Err(failed) = self.enter(call).await {
            return failed;
        }

        let state = self.lock();
        if state.session.is_none() {
            return ScoreListResponse::failed("no active session");
        }
        let mut items = state.ranked(key);
        items.truncate(count);

        ScoreListResponse {
            success: true,
            items,
            error: String::new(),
        }
    }

    async fn get_member_rank(
        &self,
        key: &LeaderboardKey,
        member_id: &MemberId,
    ) -> MemberRankResponse {
        let call = ServiceCall::GetMemberRank {
            key: key.clone(),
            member_id: member_id.clone(),
        };
        if let Err(failed) = self.enter(call).await {
            return failed;
        }

        let state = self.lock();
        if state.session.is_none() {
            return MemberRankResponse::failed("no active session");
        }

        let row = state
            .ranked(key)
            .into_iter()
            .find(|row| &row.member_id == member_id);

        match row {
            Some(row) => MemberRankResponse {
                success: true,
                member_id: row.member_id,
                rank: row.rank,
                score: row.score,
                player: Some(row.player),
                error: String::new(),
            },
            // Not on the board yet: a valid, successful answer.
            None => MemberRankResponse {
                success: true,
                member_id: member_id.clone(),
                ..MemberRankResponse::default()
            },
        }
    }
}
