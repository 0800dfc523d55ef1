//! Fixed-rate simulation tick
//!
//! One pass over the board: every mover takes its turn in insertion order,
//! the player eats and checks for contact, then win/loss is decided.

use super::collision::{cell_of, circles_overlap, in_bounds};
use super::mover::Direction;
use super::state::{Board, DirtyRegion, GameEvent, GamePhase, Outcome};
use crate::error::{SimError, SimResult};

/// Commands collected between ticks and consumed by the next one
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Heading requested for the player
    pub player_direction: Option<Direction>,
}

/// What one tick changed, for the collaborators outside the core
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outcome: Option<Outcome>,
    pub events: Vec<GameEvent>,
    /// Old and new footprint of every mover that moved
    pub dirty: Vec<DirtyRegion>,
}

/// Advance the board by one tick.
///
/// Does nothing unless the board is `Running`. A loss takes priority over
/// a win reached in the same tick. An error leaves the board untouched.
pub fn tick(board: &mut Board, input: &TickInput, ticks_per_second: u32) -> SimResult<TickReport> {
    let mut report = TickReport::default();
    if board.phase != GamePhase::Running {
        return Ok(report);
    }

    // Every later lookup stays in range once all movers start inside the maze
    for m in &board.movers {
        let pos = m.mover.pos();
        if !in_bounds(&board.grid, pos, m.mover.radius()) {
            log::warn!("{} is outside the maze at {pos:?}", m.tag);
            return Err(SimError::OutOfRange {
                x: pos.x.floor() as i32,
                y: pos.y.floor() as i32,
            });
        }
    }

    board.time_ticks += 1;

    let Board {
        grid, movers, rng, ..
    } = board;
    let mut caught = false;

    for i in 0..movers.len() {
        let mover = &mut movers[i].mover;
        let requested = if mover.is_player() {
            input.player_direction
        } else {
            None
        };
        let heading = mover.plan_direction(requested, rng);
        let step = mover.step(grid, heading, ticks_per_second)?;
        if step.moved {
            report.dirty.push(mover.dirty_region_at(step.from));
            report.dirty.push(mover.dirty_region_at(step.to));
        }

        if !mover.is_player() {
            continue;
        }

        mover.advance_animation(ticks_per_second);
        let (x, y) = cell_of(mover.pos());
        if grid.consume_pellet(x, y)? {
            log::debug!("Pellet eaten at ({x}, {y}), {} left", grid.remaining_pellets());
            report.events.push(GameEvent::PelletEaten { x, y });
        }

        let me = &movers[i].mover;
        let hit = movers.iter().enumerate().any(|(j, other)| {
            j != i && circles_overlap(me.pos(), me.radius(), other.mover.pos(), other.mover.radius())
        });
        if hit {
            log::debug!("Player caught at {:?}", me.pos());
            caught = true;
        }
    }

    if caught {
        board.phase = GamePhase::Lost;
        report.outcome = Some(Outcome::Lost);
    } else if board.grid.remaining_pellets() == 0 {
        board.phase = GamePhase::Won;
        report.outcome = Some(Outcome::Won);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::GridMap;
    use crate::sim::mover::Mover;
    use crate::sim::state::PLAYER_TAG;
    use glam::Vec2;

    const TPS: u32 = 15;

    fn board(layout: &str, player: (f32, f32)) -> Board {
        let grid = GridMap::load(3, 3, layout).unwrap();
        let mut board = Board::new(1, grid, 12345);
        let mut p = Mover::player();
        p.set_position(player.0, player.1);
        p.set_speed(1.0).unwrap();
        board.add_mover(PLAYER_TAG, p);
        board.phase = GamePhase::Running;
        board
    }

    fn add_adversary(board: &mut Board, tag: &str, pos: (f32, f32), speed: f32) {
        let mut a = Mover::adversary();
        a.set_position(pos.0, pos.1);
        a.set_speed(speed).unwrap();
        board.add_mover(tag, a);
    }

    #[test]
    fn test_tick_ignored_unless_running() {
        let mut board = board("222\n222\n222", (0.5, 0.5));
        board.phase = GamePhase::Paused;
        let input = TickInput {
            player_direction: Some(Direction::Right),
        };
        let report = tick(&mut board, &input, TPS).unwrap();
        assert!(report.outcome.is_none());
        assert_eq!(board.time_ticks, 0);
        assert_eq!(board.player().unwrap().pos(), Vec2::new(0.5, 0.5));
        assert_eq!(board.grid.remaining_pellets(), 9);
    }

    #[test]
    fn test_tick_player_eats_and_reports() {
        let mut board = board("121\n111\n111", (1.2, 0.5));
        let input = TickInput {
            player_direction: Some(Direction::Right),
        };
        let report = tick(&mut board, &input, TPS).unwrap();
        assert_eq!(report.events, vec![GameEvent::PelletEaten { x: 1, y: 0 }]);
        assert_eq!(report.dirty.len(), 2);
        assert_eq!(report.outcome, Some(Outcome::Won));
        assert_eq!(board.phase, GamePhase::Won);
    }

    #[test]
    fn test_tick_player_keeps_heading() {
        let mut board = board("111\n111\n112", (0.5, 2.5));
        let go = TickInput {
            player_direction: Some(Direction::Right),
        };
        tick(&mut board, &go, TPS).unwrap();
        for _ in 0..40 {
            if board.phase != GamePhase::Running {
                break;
            }
            tick(&mut board, &TickInput::default(), TPS).unwrap();
        }
        // Ran right along the bottom row into the pellet corner
        assert_eq!(board.phase, GamePhase::Won);
    }

    #[test]
    fn test_tick_contact_loses() {
        let mut board = board("111\n121\n111", (0.5, 0.5));
        add_adversary(&mut board, "adversary0", (0.5, 0.5), 0.0);
        let report = tick(&mut board, &TickInput::default(), TPS).unwrap();
        assert_eq!(report.outcome, Some(Outcome::Lost));
        assert_eq!(board.phase, GamePhase::Lost);

        // Terminal: further ticks change nothing
        let before = board.time_ticks;
        tick(&mut board, &TickInput::default(), TPS).unwrap();
        assert_eq!(board.time_ticks, before);
    }

    #[test]
    fn test_loss_beats_win_in_same_tick() {
        let mut board = board("211\n111\n111", (0.5, 0.5));
        add_adversary(&mut board, "adversary0", (0.9, 0.5), 0.0);
        let report = tick(&mut board, &TickInput::default(), TPS).unwrap();
        assert_eq!(report.events, vec![GameEvent::PelletEaten { x: 0, y: 0 }]);
        assert_eq!(report.outcome, Some(Outcome::Lost));
    }

    #[test]
    fn test_mover_outside_maze_fails_without_side_effects() {
        let mut board = board("222\n222\n222", (0.5, 0.5));
        add_adversary(&mut board, "adversary0", (2.5, 2.5), 1.0);
        add_adversary(&mut board, "adversary1", (5.0, 5.0), 1.0);
        let input = TickInput {
            player_direction: Some(Direction::Right),
        };

        let err = tick(&mut board, &input, TPS).unwrap_err();
        assert_eq!(err, SimError::OutOfRange { x: 5, y: 5 });
        assert_eq!(board.time_ticks, 0);
        assert_eq!(board.phase, GamePhase::Running);
        assert_eq!(board.grid.remaining_pellets(), 9);
        assert_eq!(board.player().unwrap().pos(), Vec2::new(0.5, 0.5));
        assert_eq!(board.player().unwrap().direction(), Direction::Stopped);
        assert_eq!(board.mover("adversary0").unwrap().pos(), Vec2::new(2.5, 2.5));
    }

    #[test]
    fn test_adversaries_wander_deterministically() {
        let run = || {
            let mut b = board("111\n111\n112", (0.5, 0.5));
            add_adversary(&mut b, "adversary0", (2.5, 0.5), 2.0);
            let mut trail = Vec::new();
            for _ in 0..30 {
                tick(&mut b, &TickInput::default(), TPS).unwrap();
                trail.push(b.mover("adversary0").unwrap().pos());
            }
            trail
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert!(a.iter().any(|p| *p != Vec2::new(2.5, 0.5)));
    }
}
