//! HTTP backend for a LootLocker-style leaderboard API, using `reqwest`.
//!
//! Endpoints used:
//!
//! ```text
//! POST  /game/v2/session/guest                 → guest session (token + player id)
//! PATCH /game/player/name                      → display name
//! POST  /game/leaderboards/{key}/submit        → score submission
//! GET   /game/leaderboards/{key}/list?count=N  → top N
//! GET   /game/leaderboards/{key}/member/{id}   → one member's rank
//! ```
//!
//! Every call after the guest session carries the session token in the
//! `x-session-token` header. Keys and member ids are percent-encoded as
//! single path segments.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use rapidboard_protocol::{
    Codec, GuestSessionResponse, JsonCodec, LeaderboardKey, MemberId,
    MemberRankResponse, PlayerNameResponse, RemoteResponse, ScoreListResponse,
    SubmitScoreResponse,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{LeaderboardService, ServiceError};

const SESSION_HEADER: &str = "x-session-token";

// ---------------------------------------------------------------------------
// HttpConfig
// ---------------------------------------------------------------------------

/// Settings for [`HttpLeaderboardService`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API root, e.g. `https://api.lootlocker.io`. A trailing `/` is ignored.
    pub base_url: String,
    /// The game's API key.
    pub game_key: String,
    /// Reported to the backend with the guest session.
    pub game_version: String,
    /// Device-local identifier of the guest. The same identifier resumes
    /// the same guest player across runs; empty lets the backend mint one.
    pub player_identifier: String,
    /// Upper bound for a single request. A request that exceeds it
    /// resolves as a failed response.
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lootlocker.io".to_string(),
            game_key: String::new(),
            game_version: "0.0.0.1".to_string(),
            player_identifier: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl HttpConfig {
    /// Creates a config for the given game key with default settings.
    pub fn new(game_key: impl Into<String>) -> Self {
        Self {
            game_key: game_key.into(),
            ..Self::default()
        }
    }

    /// Sets the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the reported game version.
    pub fn with_game_version(mut self, version: impl Into<String>) -> Self {
        self.game_version = version.into();
        self
    }

    /// Sets the device-local guest identifier.
    pub fn with_player_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.player_identifier = identifier.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// Request / error bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GuestSessionRequest<'a> {
    game_key: &'a str,
    game_version: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    player_identifier: &'a str,
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

#[derive(Serialize)]
struct PlayerNameRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct SubmitScoreRequest<'a> {
    member_id: &'a str,
    score: i64,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: String,
    error: String,
}

// ---------------------------------------------------------------------------
// HttpLeaderboardService
// ---------------------------------------------------------------------------

/// A [`LeaderboardService`] backed by the remote HTTP API.
pub struct HttpLeaderboardService {
    client: Client,
    base_url: String,
    base: Url,
    config: HttpConfig,
    codec: JsonCodec,
    /// Token of the active guest session, set by `start_guest_session`.
    session_token: RwLock<Option<String>>,
}

impl HttpLeaderboardService {
    /// Creates a service from `config`.
    ///
    /// # Errors
    /// - [`ServiceError::InvalidConfig`] if `base_url` is empty or not a
    ///   usable URL.
    /// - [`ServiceError::Request`] if the HTTP client can't be built.
    pub fn new(config: HttpConfig) -> Result<Self, ServiceError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ServiceError::InvalidConfig("base_url is empty".into()));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| ServiceError::InvalidConfig(format!("base_url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfig(format!(
                "base_url {base_url:?} cannot take a path"
            )));
        }

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            base,
            config,
            codec: JsonCodec,
            session_token: RwLock::new(None),
        })
    }

    /// The normalized API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configuration this service was created with.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Whether a guest session token is held.
    pub fn has_session(&self) -> bool {
        self.session_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The base URL with `segments` appended, each one encoded on its own.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ServiceError> {
        let token = self
            .session_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ServiceError::NoSession)?;
        Ok(request.header(SESSION_HEADER, token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(self.codec.decode(&body)?);
        }

        let parsed: ErrorBody = self.codec.decode(&body).unwrap_or_default();
        let message = if !parsed.message.is_empty() {
            parsed.message
        } else if !parsed.error.is_empty() {
            parsed.error
        } else {
            format!("HTTP {}", status.as_u16())
        };
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_authorized<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let request = self.authorized(request)?;
        self.send(request).await
    }
}

/// Turns a call result into the response the trait hands out.
fn settle<T: RemoteResponse>(operation: &'static str, result: Result<T, ServiceError>) -> T {
    match result {
        Ok(response) => response.succeeded(),
        Err(e) => {
            tracing::debug!(operation, error = %e, "leaderboard request failed");
            T::failed(e.to_string())
        }
    }
}

impl LeaderboardService for HttpLeaderboardService {
    async fn start_guest_session(&self) -> GuestSessionResponse {
        let body = GuestSessionRequest {
            game_key: &self.config.game_key,
            game_version: &self.config.game_version,
            player_identifier: &self.config.player_identifier,
        };
        let request = self.client.post(self.url(&["game", "v2", "session", "guest"])).json(&body);

        let response = settle(
            "start_guest_session",
            self.send::<GuestSessionResponse>(request).await,
        );
        if response.success {
            *self
                .session_token
                .write()
                .unwrap_or_else(PoisonError::into_inner) =
                Some(response.session_token.clone());
            tracing::debug!(player_id = %response.player_id, "guest session started");
        }
        response
    }

    async fn set_player_name(&self, name: &str) -> PlayerNameResponse {
        let request = self
            .client
            .patch(self.url(&["game", "player", "name"]))
            .json(&PlayerNameRequest { name });
        settle("set_player_name", self.send_authorized(request).await)
    }

    async fn submit_score(
        &self,
        member_id: &MemberId,
        score: i64,
        key: &LeaderboardKey,
    ) -> SubmitScoreResponse {
        let request = self
            .client
            .post(self.url(&["game", "leaderboards", key.as_str(), "submit"]))
            .json(&SubmitScoreRequest {
                member_id: member_id.as_str(),
                score,
            });
        settle("submit_score", self.send_authorized(request).await)
    }

    async fn get_score_list(&self, key: &LeaderboardKey, count: usize) -> ScoreListResponse {
        let request = self
            .client
            .get(self.url(&["game", "leaderboards", key.as_str(), "list"]))
            .query(&[("count", count)]);
        let result = self
            .send_authorized::<ScoreListResponse>(request)
            .await
            .and_then(|list| {
                list.check_order()?;
                Ok(list)
            });
        settle("get_score_list", result)
    }

    async fn get_member_rank(
        &self,
        key: &LeaderboardKey,
        member_id: &MemberId,
    ) -> MemberRankResponse {
        let request = self.client.get(self.url(&[
            "game",
            "leaderboards",
            key.as_str(),
            "member",
            member_id.as_str(),
        ]));
        settle("get_member_rank", self.send_authorized(request).await)
    }
}
