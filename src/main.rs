//! Pellet Chase headless runner
//!
//! Plays the game without a renderer: the player is steered by a random
//! turner that picks a new heading whenever it gets stuck. Events are
//! logged as they are drained.
//!
//! Usage: `pellet-chase [config.json] [max-seconds]`

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use pellet_chase::sim::{Direction, GameEvent, GamePhase};
use pellet_chase::{GameConfig, GameController, SimResult};

const DEFAULT_MAX_SECONDS: u64 = 120;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pellet Chase (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let max_seconds = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_SECONDS);
    let poll = config.tick_delay();

    let mut game = GameController::new(config)?;
    game.new_game()?;

    let deadline = Instant::now() + Duration::from_secs(max_seconds);
    while Instant::now() < deadline {
        steer(&game);
        thread::sleep(poll);

        let mut intermission = false;
        for event in game.drain_events() {
            match serde_json::to_string(&event) {
                Ok(json) => log::info!("event {json}"),
                Err(e) => log::warn!("Unserializable event {event:?}: {e}"),
            }
            if let GameEvent::GameWon {
                intermission: true, ..
            } = event
            {
                intermission = true;
            }
        }
        // Renderer stand-in
        game.take_dirty_regions();

        if let Some(fault) = game.take_fault() {
            return Err(fault);
        }
        if intermission {
            log::info!("Intermission...");
            thread::sleep(Duration::from_secs(1));
            game.on_intermission_complete()?;
            continue;
        }
        if game.state().is_terminal() {
            break;
        }
    }

    game.shutdown();
    let phase = game.state();
    log::info!(
        "Finished: {phase:?} on level {} with {} pellets left",
        game.current_level(),
        game.remaining_pellets()
    );
    if phase == GamePhase::Running {
        log::warn!("Time limit reached");
    }
    Ok(())
}

/// Random turner: give the player a new heading once it stops
fn steer(game: &GameController) {
    let stopped = game
        .with_board(|b| b.player().map(|p| p.direction() == Direction::Stopped))
        .flatten()
        .unwrap_or(false);
    if stopped {
        game.direct_player(Direction::random(&mut rand::rng()));
    }
}
