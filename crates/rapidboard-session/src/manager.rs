//! The session manager: owns the guest identity and the runner.
//!
//! Every leaderboard call in Rapidboard goes through here. The manager:
//! - runs the guest bootstrap, once
//! - persists the resulting member id
//! - issues the four identity-scoped calls through its runner
//!
//! # Bootstrap ordering
//!
//! Readers that need the identity (`set_name`, `get_member_rank`, the
//! façade's submit) first wait for an in-flight bootstrap to settle, so
//! they never observe the half-initialized state. Plain reads
//! ([`player_id`](SessionManager::player_id)) don't wait.

use std::sync::Arc;

use rapidboard_protocol::{
    LeaderboardKey, MemberId, MemberRankResponse, PlayerNameResponse,
    ScoreListResponse, SubmitScoreResponse,
};
use rapidboard_runner::{OperationRunner, RunnerMetrics};
use rapidboard_service::LeaderboardService;
use tokio::sync::watch;

use crate::{BootstrapState, Identity, IdentityStore, SessionConfig, SessionError};

/// Owner of the guest identity and of the runner all calls go through.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ identity-scoped calls ... ──→ shutdown()
///              │
///              └─ guest session call, exactly once
/// ```
///
/// Shared as `Arc<SessionManager<S>>` by every leaderboard handle.
pub struct SessionManager<S: LeaderboardService> {
    service: Arc<S>,
    store: Arc<dyn IdentityStore>,
    runner: OperationRunner,
    config: SessionConfig,
    /// Bootstrap progress. The single writer is `initialize`.
    bootstrap: Arc<watch::Sender<BootstrapState>>,
}

impl<S: LeaderboardService> SessionManager<S> {
    /// Creates a manager and spawns its runner host.
    ///
    /// Must be called within a Tokio runtime. No remote call is made
    /// until [`initialize`](Self::initialize).
    pub fn new(service: Arc<S>, store: Arc<dyn IdentityStore>, config: SessionConfig) -> Self {
        let runner = OperationRunner::spawn(config.runner.clone());
        let (bootstrap, _) = watch::channel(BootstrapState::NotStarted);
        let bootstrap = Arc::new(bootstrap);

        Self {
            service,
            store,
            runner,
            config,
            bootstrap,
        }
    }

    // -----------------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------------

    /// Runs the guest bootstrap.
    ///
    /// The first call starts a guest session and, on success, persists the
    /// returned member id under `player_id_key`. On failure it logs a
    /// warning and leaves the identity unset; there is no retry.
    ///
    /// Every later (or concurrent) call makes no remote call: it waits for
    /// the first one to settle and returns the same state.
    ///
    /// The bootstrap runs on its own task. Dropping the returned future
    /// (e.g. under a timeout) stops the wait, not the bootstrap.
    pub async fn initialize(&self) -> BootstrapState {
        let claimed = self.bootstrap.send_if_modified(|state| {
            if *state == BootstrapState::NotStarted {
                *state = BootstrapState::Pending;
                true
            } else {
                false
            }
        });
        if !claimed {
            tracing::debug!("bootstrap already started, waiting for it");
            return self.wait_for_bootstrap().await;
        }

        // Detached: the state settles even if this caller is dropped.
        let bootstrap = Bootstrap {
            service: Arc::clone(&self.service),
            store: Arc::clone(&self.store),
            runner: self.runner.clone(),
            player_id_key: self.config.player_id_key.clone(),
            state: Arc::clone(&self.bootstrap),
        };
        match tokio::spawn(bootstrap.run()).await {
            Ok(state) => state,
            Err(e) => {
                let state = BootstrapState::Failed(format!("bootstrap task failed: {e}"));
                tracing::warn!(error = %e, "guest session task did not finish");
                self.bootstrap.send_replace(state.clone());
                state
            }
        }
    }

    /// Current bootstrap progress.
    pub fn bootstrap_state(&self) -> BootstrapState {
        self.bootstrap.borrow().clone()
    }

    /// Waits until no bootstrap is in flight and returns its state.
    ///
    /// Returns immediately when the bootstrap is settled or was never
    /// started.
    pub async fn wait_for_bootstrap(&self) -> BootstrapState {
        let mut rx = self.bootstrap.subscribe();
        match rx.wait_for(|state| *state != BootstrapState::Pending).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`; unreachable while we're borrowed.
            Err(_) => self.bootstrap_state(),
        }
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The persisted member id, or `""` if none was ever stored.
    ///
    /// Reads the store directly and doesn't wait for the bootstrap.
    pub fn player_id(&self) -> String {
        self.store.get_string(&self.config.player_id_key)
    }

    /// The identity calls are made as, without waiting.
    ///
    /// Once the bootstrap has settled this is its outcome; a failed
    /// bootstrap means `Unset` even if an earlier run left an id behind.
    /// Before that it is whatever the store holds.
    pub fn identity(&self) -> Identity {
        match self.bootstrap_state() {
            BootstrapState::Established(id) => Identity::Member(id),
            BootstrapState::Failed(_) => Identity::Unset,
            BootstrapState::NotStarted | BootstrapState::Pending => {
                Identity::from_stored(self.player_id())
            }
        }
    }

    /// Waits for the bootstrap to settle, then returns the identity.
    pub async fn settled_identity(&self) -> Identity {
        self.wait_for_bootstrap().await;
        self.identity()
    }

    // -----------------------------------------------------------------------
    // Identity-scoped calls
    // -----------------------------------------------------------------------

    /// Sets the display name of the current guest.
    pub async fn set_name(&self, name: &str) -> Result<PlayerNameResponse, SessionError> {
        self.wait_for_bootstrap().await;

        let service = Arc::clone(&self.service);
        let name = name.to_string();
        let response = self
            .runner
            .run("set_player_name", async move {
                service.set_player_name(&name).await
            })
            .await?;
        Ok(response)
    }

    /// Submits `score` for `member_id` to the leaderboard `key`.
    pub async fn submit_score(
        &self,
        member_id: &MemberId,
        score: i64,
        key: &LeaderboardKey,
    ) -> Result<SubmitScoreResponse, SessionError> {
        let service = Arc::clone(&self.service);
        let member_id = member_id.clone();
        let key = key.clone();
        let response = self
            .runner
            .run("submit_score", async move {
                service.submit_score(&member_id, score, &key).await
            })
            .await?;
        Ok(response)
    }

    /// Fetches the top `count` rows of the leaderboard `key`.
    pub async fn get_score_list(
        &self,
        key: &LeaderboardKey,
        count: usize,
    ) -> Result<ScoreListResponse, SessionError> {
        let service = Arc::clone(&self.service);
        let key = key.clone();
        let response = self
            .runner
            .run("get_score_list", async move {
                service.get_score_list(&key, count).await
            })
            .await?;
        Ok(response)
    }

    /// Fetches the current guest's row on the leaderboard `key`.
    ///
    /// A response without a player means "not ranked yet" and is `Ok`.
    ///
    /// # Errors
    /// - [`SessionError::IdentityUnset`] when there is no identity once
    ///   the bootstrap settled. Nothing is sent.
    /// - [`SessionError::Operation`] when the remote call fails.
    pub async fn get_member_rank(
        &self,
        key: &LeaderboardKey,
    ) -> Result<MemberRankResponse, SessionError> {
        let Identity::Member(member_id) = self.settled_identity().await else {
            return Err(SessionError::IdentityUnset);
        };

        let service = Arc::clone(&self.service);
        let key = key.clone();
        let response = self
            .runner
            .run("get_member_rank", async move {
                service.get_member_rank(&key, &member_id).await
            })
            .await?;
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Accessors and shutdown
    // -----------------------------------------------------------------------

    /// The backend.
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// The configuration this manager was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Counters of the manager's runner.
    pub fn metrics(&self) -> RunnerMetrics {
        self.runner.metrics()
    }

    /// Stops the runner host. Calls still in flight fail with
    /// [`OperationError::HostStopped`](rapidboard_runner::OperationError::HostStopped),
    /// as does every call made afterwards.
    pub async fn shutdown(&self) {
        self.runner.shutdown().await;
        tracing::info!("session manager shut down");
    }
}

// ---------------------------------------------------------------------------
// Bootstrap task
// ---------------------------------------------------------------------------

/// Everything the guest bootstrap needs, owned so it can run detached
/// from the caller of `initialize`.
struct Bootstrap<S: LeaderboardService> {
    service: Arc<S>,
    store: Arc<dyn IdentityStore>,
    runner: OperationRunner,
    player_id_key: String,
    state: Arc<watch::Sender<BootstrapState>>,
}

impl<S: LeaderboardService> Bootstrap<S> {
    /// Starts the guest session, persists the member id and publishes
    /// the settled state.
    async fn run(self) -> BootstrapState {
        let service = Arc::clone(&self.service);
        let outcome = self
            .runner
            .run("start_guest_session", async move {
                service.start_guest_session().await
            })
            .await;

        let state = match outcome {
            Ok(response) if response.player_id.is_empty() => {
                BootstrapState::Failed("guest session returned no player id".to_string())
            }
            Ok(response) => self.persist(response.player_id),
            Err(e) => BootstrapState::Failed(e.message().to_string()),
        };

        match &state {
            BootstrapState::Established(player_id) => {
                tracing::info!(%player_id, "guest session established");
            }
            BootstrapState::Failed(reason) => {
                tracing::warn!(%reason, "guest session failed, continuing without identity");
            }
            BootstrapState::NotStarted | BootstrapState::Pending => {}
        }

        self.state.send_replace(state.clone());
        state
    }

    fn persist(&self, player_id: MemberId) -> BootstrapState {
        match self.store.set_string(&self.player_id_key, player_id.as_str()) {
            Ok(()) => BootstrapState::Established(player_id),
            Err(e) => BootstrapState::Failed(e.to_string()),
        }
    }
}
