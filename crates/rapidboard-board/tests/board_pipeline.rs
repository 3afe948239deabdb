//! Integration tests for the board pipelines.
//!
//! Runs the full stack (handler → leaderboard → session → runner) against
//! the in-memory backend and checks the backend's call log for ordering
//! and short-circuiting.

use std::sync::Arc;
use std::time::Duration;

use rapidboard_board::{
    BoardConfig, BoardError, BoardHandler, BoardStatus, DisplayWindow, Leaderboard, SlotText,
};
use rapidboard_protocol::{LeaderboardKey, MemberId};
use rapidboard_service::{MemoryLeaderboardService, Operation, ServiceCall};
use rapidboard_session::{MemoryStore, SessionConfig, SessionError, SessionManager};

// =========================================================================
// Helpers
// =========================================================================

type Handler = BoardHandler<MemoryLeaderboardService>;

struct Fixture {
    service: Arc<MemoryLeaderboardService>,
    session: Arc<SessionManager<MemoryLeaderboardService>>,
}

impl Fixture {
    /// A bootstrapped session on a fresh backend. The guest is member "1".
    async fn start(service: MemoryLeaderboardService) -> Self {
        let f = Self::unstarted(service);
        f.session.initialize().await;
        f
    }

    fn unstarted(service: MemoryLeaderboardService) -> Self {
        let service = Arc::new(service);
        let session = Arc::new(SessionManager::new(
            Arc::clone(&service),
            Arc::new(MemoryStore::new()),
            SessionConfig::default(),
        ));
        Self { service, session }
    }

    fn handler(&self, window: DisplayWindow) -> Handler {
        self.handler_with(window, BoardConfig::default())
    }

    fn handler_with(&self, window: DisplayWindow, config: BoardConfig) -> Handler {
        BoardHandler::new(
            Leaderboard::new("lb1", Arc::clone(&self.session)),
            window,
            config,
        )
    }

    /// Calls made after the bootstrap.
    fn calls_after_bootstrap(&self) -> Vec<Operation> {
        self.service
            .calls()
            .iter()
            .map(ServiceCall::operation)
            .filter(|op| *op != Operation::StartGuestSession)
            .collect()
    }

    fn seed_top_three(&self) {
        let key = key();
        self.service.seed_score(&key, "10", "bob", 100);
        self.service.seed_score(&key, "11", "ada", 80);
        self.service.seed_score(&key, "12", "cy", 50);
    }
}

fn key() -> LeaderboardKey {
    LeaderboardKey::new("lb1")
}

fn row(rank: &str, name: &str, score: &str) -> SlotText {
    SlotText {
        rank: rank.into(),
        name: name.into(),
        score: score.into(),
    }
}

// =========================================================================
// Leaderboard
// =========================================================================

#[tokio::test]
async fn test_leaderboard_submit_score_uses_current_identity() {
    let f = Fixture::start(MemoryLeaderboardService::new().with_guest_id("77")).await;
    let board = Leaderboard::new("lb1", Arc::clone(&f.session));

    board.submit_score(42).await.unwrap();

    assert!(f.service.calls().contains(&ServiceCall::SubmitScore {
        member_id: MemberId::new("77"),
        score: 42,
        key: key(),
    }));
}

#[tokio::test]
async fn test_leaderboard_submit_score_without_identity_sends_nothing() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::StartGuestSession, "down");
    let f = Fixture::start(service).await;
    let board = Leaderboard::new("lb1", Arc::clone(&f.session));

    let result = board.submit_score(42).await;

    assert!(matches!(result, Err(SessionError::IdentityUnset)));
    assert_eq!(f.service.call_count(Operation::SubmitScore), 0);
}

#[tokio::test]
async fn test_leaderboards_with_different_keys_are_independent() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let weekly = Leaderboard::new("weekly", Arc::clone(&f.session));
    let daily = Leaderboard::new("daily", Arc::clone(&f.session));

    weekly.submit_score(10).await.unwrap();

    assert_eq!(weekly.get_score_list(5).await.unwrap().items.len(), 1);
    assert!(daily.get_score_list(5).await.unwrap().items.is_empty());
}

// =========================================================================
// submit_and_refresh
// =========================================================================

#[tokio::test]
async fn test_submit_and_refresh_issues_steps_in_order() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::new(3));

    handler.submit_and_refresh_with("ada", 120).await.unwrap();

    assert_eq!(
        f.calls_after_bootstrap(),
        vec![
            Operation::SetPlayerName,
            Operation::SubmitScore,
            Operation::GetScoreList,
            Operation::GetMemberRank,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_and_refresh_waits_for_each_step_despite_latency() {
    let service = MemoryLeaderboardService::new();
    service.set_latency(Operation::SetPlayerName, Duration::from_millis(300));
    service.set_latency(Operation::GetScoreList, Duration::from_millis(300));
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    handler.submit_and_refresh_with("ada", 120).await.unwrap();

    assert_eq!(
        f.calls_after_bootstrap(),
        vec![
            Operation::SetPlayerName,
            Operation::SubmitScore,
            Operation::GetScoreList,
            Operation::GetMemberRank,
        ]
    );
}

#[tokio::test]
async fn test_submit_and_refresh_name_failure_short_circuits() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::SetPlayerName, "name rejected");
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    let err = handler.submit_and_refresh_with("ada", 120).await.unwrap_err();

    assert_eq!(err.message(), "name rejected");
    assert_eq!(f.calls_after_bootstrap(), vec![Operation::SetPlayerName]);
}

#[tokio::test]
async fn test_submit_and_refresh_submit_failure_reports_exact_message() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::SubmitScore, "rate limited");
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    let err = handler.submit_and_refresh_with("ada", 120).await.unwrap_err();

    assert_eq!(err.message(), "rate limited");
    assert_eq!(f.service.call_count(Operation::GetScoreList), 0);
    assert_eq!(f.service.call_count(Operation::GetMemberRank), 0);
    let view = handler.view();
    assert_eq!(view.status, BoardStatus::Failed("rate limited".into()));
    assert_eq!(view.info_text, "Something went wrong \nrate limited");
    assert!(!view.content_visible);
}

#[tokio::test]
async fn test_submit_and_refresh_success_shows_own_row() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    f.seed_top_three();
    let handler = f.handler(DisplayWindow::new(3));

    handler.submit_and_refresh_with("dee", 90).await.unwrap();

    let view = handler.view();
    assert_eq!(view.status, BoardStatus::Ready);
    assert!(view.content_visible);
    assert_eq!(view.info_text, "");
    assert_eq!(view.window.row(1), Some(row("2.", "dee", "90")));
    assert_eq!(view.session.text(), &row("2.", "dee", "90"));
}

#[tokio::test]
async fn test_submit_and_refresh_uses_score_provider() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::new(3)).with_score_provider(|| 555);

    handler.submit_and_refresh("ada").await.unwrap();

    assert!(f.service.calls().contains(&ServiceCall::SubmitScore {
        member_id: MemberId::new("1"),
        score: 555,
        key: key(),
    }));
}

#[tokio::test]
async fn test_submit_and_refresh_default_score_provider_submits_minus_one() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::new(3));

    handler.submit_and_refresh("ada").await.unwrap();

    assert_eq!(handler.view().session.text().score, "-1");
}

// =========================================================================
// refresh_all_entries_in_order
// =========================================================================

#[tokio::test]
async fn test_refresh_binds_rows_in_returned_order() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    f.seed_top_three();
    let handler = f.handler(DisplayWindow::new(3));

    handler.refresh_all_entries_in_order().await.unwrap();

    let window = handler.view().window;
    assert_eq!(window.ranks(), ["1.", "2.", "3."]);
    assert_eq!(window.names(), ["bob", "ada", "cy"]);
    assert_eq!(window.scores(), ["100", "80", "50"]);
}

#[tokio::test]
async fn test_refresh_not_ranked_clears_session_row_and_succeeds() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    f.seed_top_three();
    let handler = f.handler(DisplayWindow::new(3));

    let result = handler.refresh().await;

    assert!(result.is_ok());
    let view = handler.view();
    assert_eq!(view.session.text(), &row("", "", ""));
    assert_eq!(view.status, BoardStatus::Ready);
}

#[tokio::test]
async fn test_refresh_misconfigured_window_issues_no_calls() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::with_columns(3, 3, 2));

    let err = handler.refresh_all_entries_in_order().await.unwrap_err();

    assert!(matches!(err, BoardError::Misconfigured { .. }));
    assert!(f.calls_after_bootstrap().is_empty());
    assert!(matches!(handler.view().status, BoardStatus::Failed(_)));
}

#[tokio::test]
async fn test_refresh_list_failure_skips_rank_fetch() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::GetScoreList, "timeout");
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    let err = handler.refresh_all_entries_in_order().await.unwrap_err();

    assert_eq!(err.message(), "timeout");
    assert_eq!(f.calls_after_bootstrap(), vec![Operation::GetScoreList]);
}

#[tokio::test]
async fn test_refresh_rank_failure_is_returned() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::GetMemberRank, "server error");
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    let err = handler.refresh().await.unwrap_err();

    assert_eq!(err.message(), "server error");
    assert_eq!(handler.view().status, BoardStatus::Failed("server error".into()));
}

#[tokio::test]
async fn test_refresh_short_list_leaves_remaining_rows_empty() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    f.service.seed_score(&key(), "20", "solo", 1);
    let handler = f.handler(DisplayWindow::new(3));

    handler.refresh_all_entries_in_order().await.unwrap();

    let window = handler.view().window;
    assert_eq!(window.names(), ["solo", "", ""]);
    assert_eq!(window.ranks(), ["1.", "", ""]);
}

#[tokio::test]
async fn test_refresh_fetches_window_size() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::new(5));

    handler.refresh_all_entries_in_order().await.unwrap();

    assert!(f.service.calls().contains(&ServiceCall::GetScoreList {
        key: key(),
        count: 5
    }));
}

#[tokio::test]
async fn test_refresh_without_session_fails_at_list() {
    let service = MemoryLeaderboardService::new();
    service.fail_next(Operation::StartGuestSession, "down");
    let f = Fixture::start(service).await;
    let handler = f.handler(DisplayWindow::new(3));

    let err = handler.refresh_all_entries_in_order().await.unwrap_err();

    assert_eq!(err.message(), "no active session");
    assert_eq!(f.service.call_count(Operation::GetMemberRank), 0);
}

// =========================================================================
// enable / can_submit
// =========================================================================

#[tokio::test]
async fn test_enable_without_refresh_on_enable_does_nothing() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler(DisplayWindow::new(3));

    handler.enable().await.unwrap();

    assert!(f.calls_after_bootstrap().is_empty());
    assert_eq!(handler.view().status, BoardStatus::Idle);
}

#[tokio::test]
async fn test_enable_with_refresh_on_enable_refreshes() {
    let f = Fixture::start(MemoryLeaderboardService::new()).await;
    let handler = f.handler_with(
        DisplayWindow::new(3),
        BoardConfig::default()
            .with_refresh_on_enable(true)
            .with_success_text("Up to date"),
    );

    handler.enable().await.unwrap();

    assert_eq!(
        f.calls_after_bootstrap(),
        vec![Operation::GetScoreList, Operation::GetMemberRank]
    );
    assert_eq!(handler.view().info_text, "Up to date");
}

#[tokio::test(start_paused = true)]
async fn test_enable_shows_loading_while_in_flight() {
    let service = MemoryLeaderboardService::new();
    service.set_latency(Operation::GetScoreList, Duration::from_millis(500));
    let f = Fixture::start(service).await;
    let handler = Arc::new(f.handler_with(
        DisplayWindow::new(3),
        BoardConfig::default().with_refresh_on_enable(true),
    ));

    let task = {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move { handler.enable().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let view = handler.view();
    assert_eq!(view.status, BoardStatus::Loading);
    assert_eq!(view.info_text, "Loading...");
    assert!(!view.content_visible);

    task.await.unwrap().unwrap();
    assert_eq!(handler.view().status, BoardStatus::Ready);
}

#[tokio::test]
async fn test_can_submit_rejects_blank_names() {
    let f = Fixture::unstarted(MemoryLeaderboardService::new());
    let handler = f.handler(DisplayWindow::new(3));

    assert!(!handler.can_submit(""));
    assert!(!handler.can_submit("   "));
    assert!(handler.can_submit("ada"));
}

// =========================================================================
// Bootstrap interplay
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_submit_during_bootstrap_waits_for_identity() {
    let service = MemoryLeaderboardService::new().with_guest_id("9");
    service.set_latency(Operation::StartGuestSession, Duration::from_millis(200));
    let f = Fixture::unstarted(service);
    let handler = f.handler(DisplayWindow::new(3));

    let init = {
        let session = Arc::clone(&f.session);
        tokio::spawn(async move { session.initialize().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    handler.submit_and_refresh_with("ada", 5).await.unwrap();
    init.await.unwrap();

    assert_eq!(f.service.calls()[0], ServiceCall::StartGuestSession);
    assert!(f.service.calls().contains(&ServiceCall::SubmitScore {
        member_id: MemberId::new("9"),
        score: 5,
        key: key(),
    }));
}
