//! Avoid The Block entry point
//!
//! The browser build is driven from JavaScript through `avoid_the_block::web`.
//! The native build plays a headless demo run with the autopilot, records the
//! result on the local leaderboard and prints the board.
//!
//! Usage: `avoid-the-block [seed] [data-dir]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use avoid_the_block::persistence::Store;
    use avoid_the_block::platform::{clock_seed, format_date, now_ms};
    use avoid_the_block::sim::{FrameClock, FrameInput, FrameOutcome, Session};
    use avoid_the_block::{Leaderboard, Settings, Tuning};

    /// Frame rate the demo pretends to render at
    const DEMO_FRAME_DT: f32 = 1.0 / 60.0;
    /// Demo runs end here even if the autopilot is still alive
    const MAX_DEMO_SECS: f32 = 300.0;
    const DEMO_NAME: &str = "Autopilot";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Seed {:?} is not a number, using the clock", arg);
            clock_seed()
        }),
        None => clock_seed(),
    };
    let store = Store::new(args.next().unwrap_or_else(|| ".".to_string()));

    let settings = Settings::load(&store);
    let tuning = Tuning::load(&store);
    let mut board = Leaderboard::load(&store);
    log::info!("Avoid The Block (native) starting, seed {}", seed);

    let mut session = Session::with_config(seed, tuning, settings.theme);
    let mut clock = FrameClock::new();
    let input = FrameInput {
        autopilot: true,
        ..Default::default()
    };

    let mut outcome = FrameOutcome::Continue;
    while outcome == FrameOutcome::Continue && session.elapsed < MAX_DEMO_SECS {
        outcome = clock.step(&mut session, &input, DEMO_FRAME_DT);
    }

    println!(
        "\n{} after {:.1}s: score {} ({} waves, theme {})",
        if outcome == FrameOutcome::PlayerDied {
            "Crashed"
        } else {
            "Survived"
        },
        session.elapsed,
        session.score,
        session.waves_spawned,
        session.theme.as_str()
    );

    if let Some(rank) = board.add(DEMO_NAME, session.score, now_ms()) {
        println!("New high score! Rank #{}", rank);
        if let Err(e) = board.save(&store) {
            log::error!("Failed saving leaderboard: {}", e);
        }
    }

    println!("\nLeaderboard (Top Scores):");
    if board.is_empty() {
        println!("  No scores yet");
    }
    for (i, entry) in board.entries.iter().enumerate() {
        println!(
            "  {}. {:<12} {:>5}  {}",
            i + 1,
            entry.name,
            entry.score,
            format_date(entry.timestamp)
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is avoid_the_block::web::start, this is just to satisfy the compiler
}
