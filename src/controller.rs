//! Game controller: level setup, the phase state machine, and the command
//! surface used by input/UI collaborators.
//!
//! Mutable game state sits behind one mutex shared with the clock worker.
//! Each tick holds the lock for its whole pass, so commands and queries
//! never observe a half-applied tick. The clock is always stopped or
//! started with the lock released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{ClockControl, SimulationClock};
use crate::config::GameConfig;
use crate::error::{SimError, SimResult};
use crate::sim::{
    Board, Direction, DirtyRegion, GameEvent, GamePhase, Outcome, TickInput, tick,
};

/// State shared between the controller and the tick worker
#[derive(Debug)]
struct Core {
    config: GameConfig,
    base_seed: u64,
    board: Option<Board>,
    /// Commands waiting for the next tick
    pending: TickInput,
    /// Next level is installed and starts when the intermission completes
    awaiting_start: bool,
    events: Vec<GameEvent>,
    dirty: Vec<DirtyRegion>,
    /// Error that stopped a clock-driven tick
    fault: Option<SimError>,
}

impl Core {
    fn phase(&self) -> GamePhase {
        self.board.as_ref().map_or(GamePhase::NotStarted, |b| b.phase)
    }

    fn build_board(&self, level: u32) -> SimResult<Board> {
        let config = self.config.level(level)?;
        Board::from_level(level, config, self.base_seed.wrapping_add(u64::from(level)))
    }

    /// Run one tick and apply its outcome
    fn tick(&mut self) -> SimResult<ClockControl> {
        let tps = self.config.ticks_per_second;
        let final_level = self.config.final_level();
        let board = self
            .board
            .as_mut()
            .ok_or(SimError::PreconditionViolation("no level has been prepared"))?;
        if board.phase != GamePhase::Running {
            return Ok(ClockControl::Stop);
        }

        let input = std::mem::take(&mut self.pending);
        let report = tick(board, &input, tps)?;
        self.events.extend(report.events);
        self.dirty.extend(report.dirty);

        let level = board.level;
        match report.outcome {
            None => Ok(ClockControl::Continue),
            Some(Outcome::Lost) => {
                log::info!("Level {level} lost after {} ticks", board.time_ticks);
                self.events.push(GameEvent::GameLost { level });
                Ok(ClockControl::Stop)
            }
            Some(Outcome::Won) => {
                let intermission = level < final_level;
                log::info!("Level {level} won after {} ticks", board.time_ticks);
                self.events.push(GameEvent::GameWon {
                    level,
                    intermission,
                });
                if intermission {
                    self.install_next(level + 1)?;
                }
                Ok(ClockControl::Stop)
            }
        }
    }

    /// Swap in the next level, `NotStarted`, for the intermission to start
    fn install_next(&mut self, level: u32) -> SimResult<()> {
        let board = self.build_board(level)?;
        log::info!(
            "Level {level} ready: {} pellets, {} movers",
            board.grid.remaining_pellets(),
            board.movers.len()
        );
        self.board = Some(board);
        self.pending = TickInput::default();
        self.awaiting_start = true;
        Ok(())
    }

    /// A failed tick leaves the board paused so nothing keeps driving it
    fn fail(&mut self, e: &SimError) {
        if let Some(board) = self.board.as_mut().filter(|b| b.phase == GamePhase::Running) {
            board.phase = GamePhase::Paused;
        }
        self.pending = TickInput::default();
        log::error!("Tick failed: {e}");
    }

    /// Tick from the clock worker; errors are logged, kept, and end the loop
    fn clocked_tick(&mut self) -> ClockControl {
        match self.tick() {
            Ok(control) => control,
            Err(e) => {
                self.fail(&e);
                self.fault = Some(e);
                ClockControl::Stop
            }
        }
    }
}

/// Top-level game state machine
#[derive(Debug)]
pub struct GameController {
    core: Arc<Mutex<Core>>,
    clock: SimulationClock,
}

impl GameController {
    /// Create a controller with no level loaded
    pub fn new(config: GameConfig) -> SimResult<Self> {
        config.validate()?;
        let base_seed = config.seed.unwrap_or_else(rand::random);
        let clock = SimulationClock::new(config.tick_delay());
        log::info!(
            "Controller ready: {} levels, {} ticks/s, seed {base_seed}",
            config.final_level(),
            config.ticks_per_second
        );
        Ok(Self {
            core: Arc::new(Mutex::new(Core {
                config,
                base_seed,
                board: None,
                pending: TickInput::default(),
                awaiting_start: false,
                events: Vec::new(),
                dirty: Vec::new(),
                fault: None,
            })),
            clock,
        })
    }

    fn core(&self) -> MutexGuard<'_, Core> {
        // A panicking tick leaves no partial state worth refusing to read
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load `level` and spawn its movers, leaving the game `NotStarted`.
    ///
    /// On failure the current level, movers and phase are left untouched.
    pub fn prepare_game(&mut self, level: u32) -> SimResult<()> {
        let board = self.core().build_board(level)?;

        self.clock.stop();

        let mut core = self.core();
        log::info!(
            "Prepared level {level}: {} pellets, {} movers",
            board.grid.remaining_pellets(),
            board.movers.len()
        );
        core.board = Some(board);
        core.pending = TickInput::default();
        core.awaiting_start = false;
        core.fault = None;
        Ok(())
    }

    /// Enter `Running` from `NotStarted` and start ticking
    pub fn start(&mut self) -> SimResult<()> {
        {
            let mut core = self.core();
            let board = core
                .board
                .as_mut()
                .ok_or(SimError::PreconditionViolation("no level has been prepared"))?;
            if board.phase != GamePhase::NotStarted {
                return Err(SimError::PreconditionViolation(
                    "start is only valid before the level has begun",
                ));
            }
            board.phase = GamePhase::Running;
            let level = board.level;
            core.awaiting_start = false;
            core.events.push(GameEvent::GameStarted { level });
            log::info!("Level {level} started");
        }
        self.run_clock()
    }

    fn run_clock(&mut self) -> SimResult<()> {
        let core = Arc::clone(&self.core);
        let started = self.clock.start(move || {
            core.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clocked_tick()
        });
        if let Err(e) = started {
            log::error!("Could not start clock: {e}");
            if let Some(board) = self.core().board.as_mut() {
                board.phase = GamePhase::Paused;
            }
            return Err(e);
        }
        Ok(())
    }

    /// `Running` -> `Paused`. No-op in any other phase.
    pub fn pause(&mut self) -> bool {
        {
            let mut core = self.core();
            match core.board.as_mut() {
                Some(board) if board.phase == GamePhase::Running => {
                    board.phase = GamePhase::Paused;
                }
                _ => return false,
            }
        }
        self.clock.stop();
        log::info!("Paused");
        true
    }

    /// `Paused` -> `Running`. No-op in any other phase.
    pub fn resume(&mut self) -> SimResult<bool> {
        {
            let mut core = self.core();
            match core.board.as_mut() {
                Some(board) if board.phase == GamePhase::Paused => {
                    board.phase = GamePhase::Running;
                }
                _ => return Ok(false),
            }
        }
        log::info!("Resumed");
        self.run_clock()?;
        Ok(true)
    }

    /// Tap-to-pause: flips between `Running` and `Paused`
    pub fn pause_toggle(&mut self) -> SimResult<()> {
        match self.state() {
            GamePhase::Running => {
                self.pause();
            }
            GamePhase::Paused => {
                self.resume()?;
            }
            phase => log::debug!("Pause toggle ignored in {phase:?}"),
        }
        Ok(())
    }

    /// Queue a heading for the player's next turn. Ignored unless running.
    pub fn direct_player(&self, direction: Direction) {
        let mut core = self.core();
        if core.phase() != GamePhase::Running {
            log::debug!("Ignoring {direction:?}: game not running");
            return;
        }
        core.pending.player_direction = Some(direction);
    }

    /// Run one tick on the calling thread.
    ///
    /// Stops the clock when the tick ends the level or fails. Returns the
    /// phase after the tick; a failed tick leaves the game `Paused`.
    pub fn on_tick(&mut self) -> SimResult<GamePhase> {
        let result = {
            let mut core = self.core();
            match core.tick() {
                Ok(control) => Ok((control, core.phase())),
                Err(e) => {
                    core.fail(&e);
                    Err(e)
                }
            }
        };
        match result {
            Ok((ClockControl::Continue, phase)) => Ok(phase),
            Ok((ClockControl::Stop, phase)) => {
                self.clock.stop();
                Ok(phase)
            }
            Err(e) => {
                self.clock.stop();
                Err(e)
            }
        }
    }

    /// Start level 1 from scratch
    pub fn new_game(&mut self) -> SimResult<()> {
        self.prepare_game(1)?;
        self.start()
    }

    /// The between-level pause is over: start the level installed by the win.
    ///
    /// Returns `false` when no level is waiting.
    pub fn on_intermission_complete(&mut self) -> SimResult<bool> {
        if !std::mem::take(&mut self.core().awaiting_start) {
            return Ok(false);
        }
        self.start()?;
        Ok(true)
    }

    /// Debug cheat: leave a single pellet on the board
    pub fn cheat_clear_pellets(&self) -> usize {
        let mut core = self.core();
        let Some(board) = core.board.as_mut() else {
            return 0;
        };
        let cleared = board.grid.clear_all_but_one();
        log::warn!("Cheat: cleared {cleared} pellets");
        cleared
    }

    /// Stop ticking without changing the phase (app shutdown)
    pub fn shutdown(&mut self) {
        self.clock.stop();
    }

    pub fn state(&self) -> GamePhase {
        self.core().phase()
    }

    /// Current level number, 0 before any level is prepared
    pub fn current_level(&self) -> u32 {
        self.core().board.as_ref().map_or(0, |b| b.level)
    }

    pub fn remaining_pellets(&self) -> usize {
        self.core()
            .board
            .as_ref()
            .map_or(0, |b| b.grid.remaining_pellets())
    }

    pub fn is_ticking(&self) -> bool {
        self.clock.is_running()
    }

    /// Events emitted since the last drain, oldest first
    pub fn drain_events(&self) -> Vec<GameEvent> {
        std::mem::take(&mut self.core().events)
    }

    /// Regions to redraw since the last drain
    pub fn take_dirty_regions(&self) -> Vec<DirtyRegion> {
        std::mem::take(&mut self.core().dirty)
    }

    /// Error that stopped the clock, if any
    pub fn take_fault(&self) -> Option<SimError> {
        self.core().fault.take()
    }

    /// Read-only view of the board between ticks
    pub fn with_board<R>(&self, f: impl FnOnce(&Board) -> R) -> Option<R> {
        self.core().board.as_ref().map(f)
    }

    #[cfg(test)]
    pub(crate) fn with_board_mut<R>(&self, f: impl FnOnce(&mut Board) -> R) -> Option<R> {
        self.core().board.as_mut().map(f)
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.clock.stop();
    }
}
