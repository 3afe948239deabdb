//! The `Rapidboard` context object and its builder.
//!
//! A [`Rapidboard`] is created once on startup and handed to whatever
//! needs leaderboards. It owns the session (and through it the runner and
//! the identity store). [`shutdown`](Rapidboard::shutdown) ends it; so
//! does dropping it together with every handle it gave out.

use std::fmt::Write as _;
use std::sync::Arc;

use rand::Rng;
use rapidboard_board::{BoardConfig, BoardHandler, DisplayWindow, Leaderboard};
use rapidboard_service::LeaderboardService;
#[cfg(feature = "http")]
use rapidboard_service::{HttpConfig, HttpLeaderboardService};
use rapidboard_session::{
    BootstrapState, IdentityStore, MemoryStore, SessionConfig, SessionManager, StoreError,
};

#[cfg(feature = "http")]
use crate::RapidboardError;

/// Builder for a [`Rapidboard`] context.
///
/// # Example
///
/// ```rust,ignore
/// use rapidboard::prelude::*;
///
/// let rapidboard = RapidboardBuilder::new()
///     .store(JsonFileStore::open("identity.json")?)
///     .http_config(HttpConfig::new("my-game-key"))
///     .start_http()
///     .await?;
/// ```
pub struct RapidboardBuilder {
    store: Arc<dyn IdentityStore>,
    session_config: SessionConfig,
    #[cfg(feature = "http")]
    http_config: HttpConfig,
}

impl RapidboardBuilder {
    /// Creates a builder with an in-memory store and default settings.
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            session_config: SessionConfig::default(),
            #[cfg(feature = "http")]
            http_config: HttpConfig::default(),
        }
    }

    /// Sets the identity store.
    pub fn store(mut self, store: impl IdentityStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Sets an identity store that is also used elsewhere.
    pub fn shared_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = store;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the HTTP backend configuration.
    #[cfg(feature = "http")]
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Builds the context around `service`. No remote call is made.
    ///
    /// Must be called within a Tokio runtime.
    pub fn build<S: LeaderboardService>(self, service: S) -> Rapidboard<S> {
        let session = SessionManager::new(Arc::new(service), self.store, self.session_config);
        Rapidboard {
            session: Arc::new(session),
        }
    }

    /// Builds the context around `service` and runs the guest bootstrap.
    ///
    /// A failed bootstrap doesn't fail startup: the context comes up
    /// without an identity, and [`Rapidboard::bootstrap_state`] says why.
    pub async fn start<S: LeaderboardService>(self, service: S) -> Rapidboard<S> {
        let rapidboard = self.build(service);
        rapidboard.initialize().await;
        rapidboard
    }

    /// Builds the context around the HTTP backend.
    ///
    /// When the HTTP config has no `player_identifier`, the device
    /// identifier from the store is used (created on first run), so the
    /// same guest is resumed across runs.
    ///
    /// # Errors
    /// - [`RapidboardError::Store`] if a new device identifier can't be
    ///   persisted.
    /// - [`RapidboardError::Service`] if the HTTP client can't be built.
    #[cfg(feature = "http")]
    pub fn build_http(mut self) -> Result<Rapidboard<HttpLeaderboardService>, RapidboardError> {
        if self.http_config.player_identifier.is_empty() {
            let device_id = ensure_device_id(&*self.store, &self.session_config.device_id_key)?;
            self.http_config.player_identifier = device_id;
        }
        let service = HttpLeaderboardService::new(self.http_config.clone())?;
        Ok(self.build(service))
    }

    /// [`build_http`](Self::build_http), then the guest bootstrap.
    #[cfg(feature = "http")]
    pub async fn start_http(self) -> Result<Rapidboard<HttpLeaderboardService>, RapidboardError> {
        let rapidboard = self.build_http()?;
        rapidboard.initialize().await;
        Ok(rapidboard)
    }
}

impl Default for RapidboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the device identifier stored under `key`, creating and
/// persisting a random one (128 bits, hex) if there is none.
pub fn ensure_device_id(store: &dyn IdentityStore, key: &str) -> Result<String, StoreError> {
    let existing = store.get_string(key);
    if !existing.is_empty() {
        return Ok(existing);
    }

    let bytes: [u8; 16] = rand::rng().random();
    let device_id = bytes.iter().fold(String::with_capacity(32), |mut hex, b| {
        let _ = write!(hex, "{b:02x}");
        hex
    });
    store.set_string(key, &device_id)?;
    tracing::info!(%device_id, "new device identifier created");
    Ok(device_id)
}

// ---------------------------------------------------------------------------
// Rapidboard
// ---------------------------------------------------------------------------

/// The Rapidboard context: one guest identity and one runner.
///
/// Create it on startup (usually with [`RapidboardBuilder::start`]) and
/// hand out leaderboards and boards from it. Everything it hands out
/// shares its session.
pub struct Rapidboard<S: LeaderboardService> {
    session: Arc<SessionManager<S>>,
}

impl<S: LeaderboardService> Rapidboard<S> {
    /// Runs the guest bootstrap. Only the first call does anything; see
    /// [`SessionManager::initialize`].
    pub async fn initialize(&self) -> BootstrapState {
        self.session.initialize().await
    }

    /// Current bootstrap progress.
    pub fn bootstrap_state(&self) -> BootstrapState {
        self.session.bootstrap_state()
    }

    /// The persisted member id, `""` if none.
    pub fn player_id(&self) -> String {
        self.session.player_id()
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<SessionManager<S>> {
        &self.session
    }

    /// The backend.
    pub fn service(&self) -> &Arc<S> {
        self.session.service()
    }

    /// A handle to the leaderboard `key`.
    pub fn leaderboard(&self, key: impl Into<String>) -> Leaderboard<S> {
        Leaderboard::new(key, Arc::clone(&self.session))
    }

    /// A board for the leaderboard `key`.
    pub fn board(
        &self,
        key: impl Into<String>,
        window: DisplayWindow,
        config: BoardConfig,
    ) -> BoardHandler<S> {
        BoardHandler::new(self.leaderboard(key), window, config)
    }

    /// Stops the runner. Leaderboards and boards handed out earlier stay
    /// valid as values, but every call they make fails with
    /// [`OperationError::HostStopped`](rapidboard_runner::OperationError::HostStopped).
    pub async fn shutdown(self) {
        self.session.shutdown().await;
        tracing::info!("rapidboard shut down");
    }
}
