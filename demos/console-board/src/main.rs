use std::env;

use rapidboard::prelude::*;

const BOARD: &str = "weekly";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_view(view: &BoardView) {
    println!("[{:?}] {}", view.status, view.info_text);
    if !view.content_visible {
        return;
    }
    for row in view.window.rows() {
        if row.is_empty() {
            println!("  -");
        } else {
            println!("  {:<4} {:<12} {:>6}", row.rank, row.name, row.score);
        }
    }
    let own = view.session.text();
    if own.is_empty() {
        println!("  you: not ranked");
    } else {
        println!("  you: {} {} {}", own.rank, own.name, own.score);
    }
}

// ---------------------------------------------------------------------------
// Demo flow
// ---------------------------------------------------------------------------

async fn play<S: LeaderboardService>(rapidboard: Rapidboard<S>, name: &str, score: i64) {
    match rapidboard.bootstrap_state() {
        BootstrapState::Established(id) => tracing::info!(%id, "playing as guest"),
        other => tracing::warn!(state = %other, "no guest session"),
    }

    let config = BoardConfig::default().with_refresh_on_enable(true);
    let board = rapidboard
        .board(BOARD, DisplayWindow::new(5), config)
        .with_score_provider(move || score);

    if let Err(e) = board.enable().await {
        tracing::warn!(error = %e, "initial refresh failed");
    }
    print_view(&board.view());

    if board.can_submit(name) {
        if let Err(e) = board.submit_and_refresh(name).await {
            tracing::warn!(error = %e, "submit failed");
        }
    }
    print_view(&board.view());

    rapidboard.shutdown().await;
}

fn demo_service() -> MemoryLeaderboardService {
    let service = MemoryLeaderboardService::new().with_guest_id("1001");
    let key = LeaderboardKey::new(BOARD);
    for (i, (name, score)) in [("ada", 940), ("grace", 880), ("linus", 610), ("ken", 420)]
        .into_iter()
        .enumerate()
    {
        service.seed_score(&key, (i + 1).to_string(), name, score);
    }
    service
}

#[tokio::main]
async fn main() {
    init_tracing();

    let mut args = env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "guest".to_string());
    let score = args.next().and_then(|s| s.parse().ok()).unwrap_or(700);

    // With a game key in the environment, talk to the real backend.
    match env::var("RAPIDBOARD_GAME_KEY") {
        Ok(game_key) => {
            let started = RapidboardBuilder::new()
                .store(match JsonFileStore::open("rapidboard-identity.json") {
                    Ok(store) => store,
                    Err(e) => {
                        eprintln!("cannot open identity store: {e}");
                        return;
                    }
                })
                .http_config(HttpConfig::new(game_key))
                .start_http()
                .await;
            match started {
                Ok(rapidboard) => play(rapidboard, &name, score).await,
                Err(e) => eprintln!("cannot start: {e}"),
            }
        }
        Err(_) => {
            let rapidboard = RapidboardBuilder::new().start(demo_service()).await;
            play(rapidboard, &name, score).await;
        }
    }
}
