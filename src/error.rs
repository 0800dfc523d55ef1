//! Simulation error kinds

use thiserror::Error;

/// Errors raised by the grid, movers, controller and configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Level text did not match the expected grid shape or alphabet
    #[error("malformed level data at line {line}: {reason}")]
    Format { line: usize, reason: String },
    /// Grid coordinate outside the bordered maze
    #[error("cell ({x}, {y}) is outside the maze")]
    OutOfRange { x: i32, y: i32 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Operation needs state that has not been set up yet
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
    /// Tick worker could not be started
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

pub type SimResult<T> = Result<T, SimError>;
