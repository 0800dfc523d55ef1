//! Board state and the types the tick pass reports outward

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{cell_of, in_bounds};
use super::grid::GridMap;
use super::mover::Mover;
use crate::config::LevelConfig;
use crate::error::{SimError, SimResult};

/// Tag of the single player mover
pub const PLAYER_TAG: &str = "player";

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level loaded, waiting for start
    #[default]
    NotStarted,
    /// Ticks are being applied
    Running,
    Paused,
    /// Every pellet eaten
    Won,
    /// Player touched an adversary
    Lost,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// How a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Discrete events for audio/UI collaborators, drained after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PelletEaten { x: i32, y: i32 },
    GameStarted { level: u32 },
    /// `intermission` is set when another level follows and the game is
    /// waiting for `on_intermission_complete`
    GameWon { level: u32, intermission: bool },
    GameLost { level: u32 },
}

/// Axis-aligned cell rectangle that needs redrawing (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// A mover plus the tag it was registered under
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedMover {
    pub tag: String,
    pub mover: Mover,
}

/// Everything the tick pass mutates for one level
#[derive(Debug, Clone)]
pub struct Board {
    /// 1-based level number
    pub level: u32,
    pub grid: GridMap,
    /// Turn order is insertion order
    pub movers: Vec<TaggedMover>,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seed the adversary RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl Board {
    /// Empty board around an already loaded grid
    pub fn new(level: u32, grid: GridMap, seed: u64) -> Self {
        Self {
            level,
            grid,
            movers: Vec::new(),
            phase: GamePhase::NotStarted,
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Load a level's grid and spawn its player and adversaries
    pub fn from_level(level: u32, config: &LevelConfig, seed: u64) -> SimResult<Self> {
        let grid = GridMap::load(config.width, config.height, &config.layout)?;
        let mut board = Self::new(level, grid, seed);

        let mut player = Mover::player();
        player.set_position(config.player_spawn.0, config.player_spawn.1);
        player.set_speed(config.player_speed)?;
        check_spawn(&board.grid, PLAYER_TAG, &player)?;
        board.add_mover(PLAYER_TAG, player);

        for i in 0..config.adversary_count {
            let mut adversary = Mover::adversary();
            adversary.set_position(config.adversary_spawn.0, config.adversary_spawn.1);
            adversary.set_speed(config.adversary_speed)?;
            check_spawn(&board.grid, "adversary", &adversary)?;
            board.add_mover(format!("adversary{i}"), adversary);
        }

        Ok(board)
    }

    /// Append a mover to the end of the turn order
    pub fn add_mover(&mut self, tag: impl Into<String>, mover: Mover) {
        self.movers.push(TaggedMover {
            tag: tag.into(),
            mover,
        });
    }

    pub fn mover(&self, tag: &str) -> Option<&Mover> {
        self.movers.iter().find(|m| m.tag == tag).map(|m| &m.mover)
    }

    pub fn mover_mut(&mut self, tag: &str) -> Option<&mut Mover> {
        self.movers
            .iter_mut()
            .find(|m| m.tag == tag)
            .map(|m| &mut m.mover)
    }

    pub fn player(&self) -> Option<&Mover> {
        self.mover(PLAYER_TAG)
    }

    pub fn player_mut(&mut self) -> Option<&mut Mover> {
        self.mover_mut(PLAYER_TAG)
    }
}

/// A spawn must sit wholly inside the maze with its center on an open cell
fn check_spawn(grid: &GridMap, what: &str, mover: &Mover) -> SimResult<()> {
    let pos = mover.pos();
    if !in_bounds(grid, pos, mover.radius()) {
        return Err(SimError::InvalidArgument(format!(
            "{what} spawn ({}, {}) is outside the {}x{} maze",
            pos.x,
            pos.y,
            grid.width(),
            grid.height()
        )));
    }
    let (x, y) = cell_of(pos);
    if grid.cell_at(x, y)?.is_solid() {
        return Err(SimError::InvalidArgument(format!(
            "{what} spawn ({}, {}) is inside a wall",
            pos.x, pos.y
        )));
    }
    Ok(())
}
