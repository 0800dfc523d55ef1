//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick rate only
//! - Seeded RNG only
//! - Stable iteration order (mover insertion order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod grid;
pub mod mover;
pub mod state;
pub mod tick;

pub use collision::{can_enter, cell_of, circles_overlap, in_bounds};
pub use grid::{CellKind, GridMap};
pub use mover::{Direction, Mover, MoverKind, StepOutcome};
pub use state::{
    Board, DirtyRegion, GameEvent, GamePhase, Outcome, PLAYER_TAG, TaggedMover,
};
pub use tick::{TickInput, TickReport, tick};
