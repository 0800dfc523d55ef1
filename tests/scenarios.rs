//! Whole-game scenarios driven through the controller

use std::thread;
use std::time::Duration;

use pellet_chase::sim::{Direction, GameEvent, GamePhase, PLAYER_TAG};
use pellet_chase::{GameConfig, GameController, LevelConfig, SimError};
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn level(layout: &str, adversary_spawn: (f32, f32), adversaries: usize) -> LevelConfig {
    LevelConfig {
        width: 3,
        height: 3,
        layout: layout.to_string(),
        player_spawn: (0.5, 0.5),
        player_speed: 1.0,
        adversary_spawn,
        adversary_count: adversaries,
        adversary_speed: 0.0,
    }
}

fn controller(levels: Vec<LevelConfig>) -> GameController {
    GameController::new(GameConfig {
        tick_delay_ms: 1,
        seed: Some(2015),
        levels,
        ..GameConfig::default()
    })
    .unwrap()
}

/// Start the level but drive every tick by hand
fn start_manual(gc: &mut GameController) {
    gc.start().unwrap();
    gc.shutdown();
}

fn player_pos(gc: &GameController) -> glam::Vec2 {
    gc.with_board(|b| b.player().unwrap().pos()).unwrap()
}

#[test]
fn center_pellet_is_eaten_and_level_won() {
    let mut gc = controller(vec![level("111\n121\n111", (2.5, 2.5), 0)]);
    gc.prepare_game(1).unwrap();
    start_manual(&mut gc);
    assert_eq!(gc.remaining_pellets(), 1);

    // Moving up inside the corner cell never touches the center
    gc.direct_player(Direction::Up);
    gc.on_tick().unwrap();
    assert_eq!(gc.remaining_pellets(), 1);
    assert!(player_pos(&gc).y < 0.5);

    // Drop into the middle row, then run right onto the center cell
    gc.direct_player(Direction::Down);
    while player_pos(&gc).y < 1.2 {
        assert_eq!(gc.on_tick().unwrap(), GamePhase::Running);
    }
    assert_eq!(gc.remaining_pellets(), 1);

    gc.direct_player(Direction::Right);
    let mut phase = GamePhase::Running;
    for _ in 0..30 {
        phase = gc.on_tick().unwrap();
        if phase != GamePhase::Running {
            break;
        }
    }
    assert_eq!(phase, GamePhase::Won);
    assert_eq!(gc.remaining_pellets(), 0);
    assert!(!gc.is_ticking());

    let events = gc.drain_events();
    assert!(events.contains(&GameEvent::PelletEaten { x: 1, y: 1 }));
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameWon {
            level: 1,
            intermission: false
        })
    );
}

#[test]
fn contact_with_adversary_loses_and_stops_clock() {
    let mut gc = controller(vec![level("111\n121\n111", (0.5, 0.5), 1)]);
    gc.prepare_game(1).unwrap();
    start_manual(&mut gc);

    assert_eq!(gc.on_tick().unwrap(), GamePhase::Lost);
    assert!(!gc.is_ticking());
    assert!(gc.drain_events().contains(&GameEvent::GameLost { level: 1 }));

    // Nothing moves any more
    let ticks = gc.with_board(|b| b.time_ticks).unwrap();
    gc.direct_player(Direction::Right);
    thread::sleep(Duration::from_millis(10));
    assert_eq!(gc.on_tick().unwrap(), GamePhase::Lost);
    assert_eq!(gc.with_board(|b| b.time_ticks).unwrap(), ticks);
    assert_eq!(player_pos(&gc), glam::Vec2::new(0.5, 0.5));
}

#[test]
fn clock_driven_loss_stops_by_itself() {
    let mut gc = controller(vec![level("111\n121\n111", (0.5, 0.5), 2)]);
    gc.prepare_game(1).unwrap();
    gc.start().unwrap();
    for _ in 0..5000 {
        if !gc.is_ticking() {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    assert!(!gc.is_ticking());
    assert_eq!(gc.state(), GamePhase::Lost);
}

#[test]
fn unsupported_level_leaves_controller_unchanged() {
    let mut gc = GameController::new(GameConfig {
        seed: Some(1),
        ..GameConfig::default()
    })
    .unwrap();
    gc.prepare_game(2).unwrap();
    let movers = gc.with_board(|b| b.movers.clone()).unwrap();

    assert!(matches!(gc.prepare_game(3), Err(SimError::InvalidArgument(_))));
    assert_eq!(gc.current_level(), 2);
    assert_eq!(gc.state(), GamePhase::NotStarted);
    assert_eq!(gc.with_board(|b| b.movers.clone()).unwrap(), movers);
}

#[test]
fn malformed_level_is_reported_not_installed() {
    let mut gc = controller(vec![
        level("111\n121\n111", (2.5, 2.5), 0),
        level("111\n1x1\n111", (2.5, 2.5), 0),
    ]);
    gc.prepare_game(1).unwrap();
    let err = gc.prepare_game(2).unwrap_err();
    assert!(matches!(err, SimError::Format { line: 2, .. }));
    assert_eq!(gc.current_level(), 1);
    assert_eq!(gc.remaining_pellets(), 1);
}

#[test]
fn spawn_inside_wall_is_rejected_not_installed() {
    let mut walled = level("011\n121\n111", (2.5, 2.5), 0);
    walled.player_spawn = (0.5, 0.5);
    let mut gc = controller(vec![level("111\n121\n111", (2.5, 2.5), 0), walled]);
    gc.prepare_game(1).unwrap();

    let err = gc.prepare_game(2).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
    assert_eq!(gc.current_level(), 1);
    assert_eq!(gc.state(), GamePhase::NotStarted);
}

#[test]
fn spawn_outside_maze_is_rejected_by_config() {
    let mut outside = level("111\n121\n111", (2.5, 2.5), 0);
    outside.player_spawn = (5.0, 5.0);
    let err = GameController::new(GameConfig {
        levels: vec![outside],
        ..GameConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}

#[test]
fn shutdown_twice_is_harmless() {
    let mut gc = controller(vec![level("111\n121\n111", (2.5, 2.5), 0)]);
    gc.new_game().unwrap();
    gc.shutdown();
    gc.shutdown();
    assert!(!gc.is_ticking());
    assert_eq!(gc.state(), GamePhase::Running);
}

#[test]
fn reference_level_keeps_invariants_under_random_play() {
    let mut gc = GameController::new(GameConfig {
        seed: Some(77),
        ..GameConfig::default()
    })
    .unwrap();
    gc.prepare_game(2).unwrap();
    start_manual(&mut gc);
    let mut steer = Pcg32::seed_from_u64(5);

    for _ in 0..2000 {
        let stopped = gc
            .with_board(|b| b.mover(PLAYER_TAG).unwrap().direction() == Direction::Stopped)
            .unwrap();
        if stopped {
            gc.direct_player(Direction::random(&mut steer));
        }

        let phase = gc.on_tick().unwrap();
        gc.with_board(|b| {
            assert_eq!(b.grid.remaining_pellets(), b.grid.count_pellet_cells());
            for m in &b.movers {
                let p = m.mover.pos();
                assert!(p.x >= 0.0 && p.x <= b.grid.width() as f32, "{} at {p:?}", m.tag);
                assert!(p.y >= 0.0 && p.y <= b.grid.height() as f32, "{} at {p:?}", m.tag);
            }
        });
        if phase.is_terminal() {
            break;
        }
    }
}
