//! Movers: the player and the wandering adversaries

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::can_enter;
use super::grid::GridMap;
use super::state::DirtyRegion;
use crate::consts::{DIRTY_MARGIN, MOVER_RADIUS};
use crate::error::{SimError, SimResult};

/// Heading of a mover. Screen convention: `Up` decreases y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Stopped,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every heading that actually moves
    pub const MOVING: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit displacement for one cell of travel
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Stopped => Vec2::ZERO,
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    /// Uniformly random moving heading
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::MOVING[rng.random_range(0..Self::MOVING.len())]
    }
}

/// Per-kind behavior and state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoverKind {
    /// Eats pellets and loses on contact with an adversary
    Player {
        /// Mouth animation counter, read by the renderer only
        mouth_countdown: u32,
    },
    /// Keeps its heading until blocked, then picks a random one
    Adversary,
}

/// Result of one movement attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Position before the step
    pub from: Vec2,
    /// Position after the step (equal to `from` when nothing moved)
    pub to: Vec2,
    pub moved: bool,
}

impl StepOutcome {
    fn stayed(pos: Vec2) -> Self {
        Self {
            from: pos,
            to: pos,
            moved: false,
        }
    }
}

/// One agent on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub kind: MoverKind,
    /// Center, in cell units
    pos: Vec2,
    radius: f32,
    direction: Direction,
    /// Cells per second
    speed: f32,
}

impl Mover {
    fn new(kind: MoverKind) -> Self {
        Self {
            kind,
            pos: Vec2::ZERO,
            radius: MOVER_RADIUS,
            direction: Direction::Stopped,
            speed: 0.0,
        }
    }

    pub fn player() -> Self {
        Self::new(MoverKind::Player { mouth_countdown: 0 })
    }

    pub fn adversary() -> Self {
        Self::new(MoverKind::Adversary)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, MoverKind::Player { .. })
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> SimResult<()> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "speed must be a non-negative number, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(())
    }

    /// Heading this mover will use on its next turn.
    ///
    /// An explicit request wins. Otherwise the current heading is kept,
    /// except that a stopped adversary draws a fresh random heading.
    pub fn plan_direction<R: Rng + ?Sized>(
        &self,
        requested: Option<Direction>,
        rng: &mut R,
    ) -> Direction {
        if let Some(dir) = requested {
            return dir;
        }
        match (self.kind, self.direction) {
            (MoverKind::Adversary, Direction::Stopped) => Direction::random(rng),
            (_, dir) => dir,
        }
    }

    /// Attempt one tick of movement toward `requested`.
    ///
    /// Stopping is unconditional. A blocked move leaves the position alone
    /// and stops the mover.
    pub fn step(
        &mut self,
        grid: &GridMap,
        requested: Direction,
        ticks_per_second: u32,
    ) -> SimResult<StepOutcome> {
        let from = self.pos;
        self.direction = requested;
        if requested == Direction::Stopped {
            return Ok(StepOutcome::stayed(from));
        }

        let distance = self.speed / ticks_per_second.max(1) as f32;
        let dest = from + requested.unit() * distance;

        if can_enter(grid, dest, self.radius, requested)? {
            self.pos = dest;
            Ok(StepOutcome {
                from,
                to: dest,
                moved: true,
            })
        } else {
            self.direction = Direction::Stopped;
            Ok(StepOutcome::stayed(from))
        }
    }

    /// Advance the player's mouth animation by one tick
    pub fn advance_animation(&mut self, ticks_per_second: u32) {
        if let MoverKind::Player { mouth_countdown } = &mut self.kind {
            *mouth_countdown = (*mouth_countdown + 1) % ticks_per_second.max(1);
        }
    }

    /// Mouth is drawn open for the first half of each animation cycle
    pub fn mouth_open(&self, ticks_per_second: u32) -> bool {
        match self.kind {
            MoverKind::Player { mouth_countdown } => mouth_countdown < ticks_per_second / 2,
            MoverKind::Adversary => false,
        }
    }

    /// Screen region covered by this mover if it were centered at `pos`
    pub fn dirty_region_at(&self, pos: Vec2) -> DirtyRegion {
        let reach = self.radius + DIRTY_MARGIN;
        DirtyRegion {
            left: (pos.x - reach) as i32,
            top: (pos.y - reach) as i32,
            right: (pos.x + reach) as i32,
            bottom: (pos.y + reach) as i32,
        }
    }
}
