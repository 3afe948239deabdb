//! Board handler: the ordered pipelines behind a leaderboard UI.
//!
//! Two pipelines, each strictly sequential:
//!
//! ```text
//! submit_and_refresh:  set name ──→ submit score ──→ refresh
//! refresh:             top N (others) ──→ own rank (self)
//! ```
//!
//! A step is issued only after the previous one succeeded and its result
//! is in the view. The first failure ends the pipeline and is returned.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rapidboard_service::LeaderboardService;

use crate::{BoardConfig, BoardError, BoardStatus, BoardView, DisplayWindow, Leaderboard};

/// Produces the score to submit, e.g. the result of the last round.
pub type ScoreProvider = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Drives one leaderboard's UI state.
///
/// All methods take `&self`, so a handler can be shared (`Arc`) between a
/// UI task and whatever triggers refreshes. Pipelines started from
/// different tasks are not serialized against each other; their view
/// updates land in network-response order.
pub struct BoardHandler<S: LeaderboardService> {
    leaderboard: Leaderboard<S>,
    config: BoardConfig,
    view: Mutex<BoardView>,
    score_provider: ScoreProvider,
}

impl<S: LeaderboardService> fmt::Debug for BoardHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardHandler")
            .field("key", self.leaderboard.key())
            .field("config", &self.config)
            .field("view", &*self.lock_view())
            .finish_non_exhaustive()
    }
}

impl<S: LeaderboardService> BoardHandler<S> {
    /// Creates a handler showing `leaderboard` in `window`.
    ///
    /// The score provider defaults to one that returns `-1`.
    pub fn new(leaderboard: Leaderboard<S>, window: DisplayWindow, config: BoardConfig) -> Self {
        if let Err(e) = window.fetch_count() {
            tracing::warn!(key = %leaderboard.key(), error = %e, "board created with a misconfigured display window");
        }

        Self {
            leaderboard,
            config,
            view: Mutex::new(BoardView::new(window)),
            score_provider: Arc::new(|| -1),
        }
    }

    /// Replaces the score provider.
    pub fn with_score_provider(mut self, provider: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.score_provider = Arc::new(provider);
        self
    }

    /// The leaderboard this handler shows.
    pub fn leaderboard(&self) -> &Leaderboard<S> {
        &self.leaderboard
    }

    /// The texts and flags this handler was created with.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// A snapshot of the view.
    pub fn view(&self) -> BoardView {
        self.lock_view().clone()
    }

    /// Whether a submit with `name` should be allowed: only for a name
    /// that isn't blank.
    pub fn can_submit(&self, name: &str) -> bool {
        !name.trim().is_empty()
    }

    // -----------------------------------------------------------------------
    // Pipelines
    // -----------------------------------------------------------------------

    /// Called when the board becomes visible.
    ///
    /// With `refresh_on_enable` this shows the loading state and runs a
    /// full refresh; otherwise it does nothing.
    pub async fn enable(&self) -> Result<(), BoardError> {
        if !self.config.refresh_on_enable {
            return Ok(());
        }
        self.refresh().await
    }

    /// Shows the loading state, refreshes, and shows the outcome.
    pub async fn refresh(&self) -> Result<(), BoardError> {
        self.set_loading();
        self.refresh_all_entries_in_order().await?;
        self.set_success();
        Ok(())
    }

    /// Sets the name, submits the score from the score provider, and
    /// refreshes.
    pub async fn submit_and_refresh(&self, name: &str) -> Result<(), BoardError> {
        let score = (self.score_provider)();
        self.submit_and_refresh_with(name, score).await
    }

    /// Sets the name, submits `score`, and refreshes; strictly in that
    /// order.
    ///
    /// The view shows loading while this runs, then either the success
    /// text or the failure template with the first error.
    ///
    /// # Errors
    /// The first failing step's error. A failed name-set means no score
    /// is submitted; a failed submission means no refresh.
    pub async fn submit_and_refresh_with(&self, name: &str, score: i64) -> Result<(), BoardError> {
        self.set_loading();

        if let Err(e) = self.leaderboard.session().set_name(name).await {
            return Err(self.fail(e.into()));
        }
        if let Err(e) = self.leaderboard.submit_score(score).await {
            return Err(self.fail(e.into()));
        }
        tracing::debug!(key = %self.leaderboard.key(), score, "score submitted");

        self.refresh_all_entries_in_order().await?;
        self.set_success();
        Ok(())
    }

    /// Refreshes the top rows, then the guest's own row.
    ///
    /// 1. Fetch the top N (N = window size) and fill the rows in the order
    ///    returned. Missing rows are cleared.
    /// 2. Only then fetch the guest's own rank. Not ranked clears the
    ///    session row and still counts as success.
    ///
    /// Doesn't touch the loading/success state; a failure does show the
    /// failure template.
    ///
    /// # Errors
    /// - [`BoardError::Misconfigured`] before any remote call when the
    ///   window's columns differ in length.
    /// - The first failing fetch. A failed list fetch means the rank is
    ///   never fetched.
    pub async fn refresh_all_entries_in_order(&self) -> Result<(), BoardError> {
        let count = self.lock_view().window.fetch_count();
        let count = match count {
            Ok(count) => count,
            Err(e) => return Err(self.fail(e)),
        };

        let list = match self.leaderboard.get_score_list(count).await {
            Ok(list) => list,
            Err(e) => return Err(self.fail(e.into())),
        };
        let entries: Vec<_> = list.items.iter().map(|item| item.entry()).collect();
        self.lock_view().window.bind(&entries);

        let rank = match self.leaderboard.get_member_rank().await {
            Ok(rank) => rank,
            Err(e) => return Err(self.fail(e.into())),
        };
        let own = rank.entry();
        self.lock_view().session.bind(own.as_ref());

        tracing::info!(
            key = %self.leaderboard.key(),
            rows = entries.len(),
            ranked = own.is_some(),
            "board refreshed"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // View state
    // -----------------------------------------------------------------------

    fn lock_view(&self) -> MutexGuard<'_, BoardView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_loading(&self) {
        let mut view = self.lock_view();
        view.status = BoardStatus::Loading;
        view.content_visible = false;
        view.info_text = self.config.loading_text.clone();
    }

    fn set_success(&self) {
        let mut view = self.lock_view();
        view.status = BoardStatus::Ready;
        view.content_visible = true;
        view.info_text = self.config.success_text.clone();
    }

    /// Shows `error` in the view, logs it, and hands it back.
    fn fail(&self, error: BoardError) -> BoardError {
        let message = error.message();
        tracing::warn!(key = %self.leaderboard.key(), error = %message, "board pipeline failed");

        let mut view = self.lock_view();
        view.status = BoardStatus::Failed(message.clone());
        view.content_visible = false;
        view.info_text = self.config.failure_message(&message);
        error
    }
}
