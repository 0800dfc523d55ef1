//! Pellet Chase - a grid maze chase simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, movers, collisions, tick pass)
//! - `clock`: Fixed-delay tick scheduler
//! - `controller`: Game state machine and command surface
//! - `config`: Data-driven level and pacing configuration

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod sim;

pub use clock::{ClockControl, SimulationClock};
pub use config::{GameConfig, LevelConfig};
pub use controller::GameController;
pub use error::{SimError, SimResult};

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate; movement distance per tick is speed / rate
    pub const TICKS_PER_SECOND: u32 = 15;
    /// Scheduler delay between ticks. Deliberately shorter than 1000 / rate.
    pub const TICK_DELAY_MS: u64 = 500 / TICKS_PER_SECOND as u64;

    /// Reference maze interior dimensions
    pub const GRID_WIDTH: usize = 14;
    pub const GRID_HEIGHT: usize = 14;

    /// Mover defaults (cell units)
    pub const MOVER_RADIUS: f32 = 0.4;
    pub const PLAYER_SPEED: f32 = 1.0;
    pub const PLAYER_SPAWN: (f32, f32) = (0.5, 0.5);
    pub const ADVERSARY_SPAWN: (f32, f32) = (1.5, 13.5);

    /// Extra cells added around a mover when reporting a dirty region
    pub const DIRTY_MARGIN: f32 = 1.0;

    /// Bundled reference level (14x14 digits)
    pub const REFERENCE_LEVEL: &str = include_str!("../levels/level.txt");
}
