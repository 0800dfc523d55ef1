//! Fixed-delay tick scheduler
//!
//! Owns at most one worker thread. Each cycle runs the tick callback to
//! completion and only then waits out the delay, so ticks never overlap.
//! `stop` wakes the worker out of its wait and joins it, so no tick runs
//! after `stop` returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{SimError, SimResult};

/// Returned by the tick callback to keep or end the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockControl {
    Continue,
    Stop,
}

struct Worker {
    running: Arc<AtomicBool>,
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Repeating tick task with start/stop semantics
pub struct SimulationClock {
    delay: Duration,
    worker: Option<Worker>,
}

impl std::fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationClock")
            .field("delay", &self.delay)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SimulationClock {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            worker: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether the worker is still cycling
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.running.load(Ordering::Acquire))
    }

    /// Start ticking. The first tick runs immediately.
    ///
    /// Does nothing if the clock is already running; the new callback is
    /// dropped in that case.
    pub fn start<F>(&mut self, mut on_tick: F) -> SimResult<()>
    where
        F: FnMut() -> ClockControl + Send + 'static,
    {
        if self.is_running() {
            log::debug!("Clock already running");
            return Ok(());
        }
        // Reap a worker that ended on its own
        self.stop();

        let running = Arc::new(AtomicBool::new(true));
        let (cancel, cancelled) = mpsc::channel::<()>();
        let delay = self.delay;
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("sim-clock".into())
            .spawn(move || {
                loop {
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    if on_tick() == ClockControl::Stop {
                        break;
                    }
                    match cancelled.recv_timeout(delay) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                flag.store(false, Ordering::Release);
            })
            .map_err(|e| SimError::Scheduler(e.to_string()))?;

        log::debug!("Clock started ({:?} delay)", delay);
        self.worker = Some(Worker {
            running,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Cancel the pending cycle and wait for an in-flight tick to finish.
    ///
    /// Safe to call repeatedly. Must not be called while holding a lock the
    /// tick callback takes.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.running.store(false, Ordering::Release);
        let _ = worker.cancel.send(());
        if worker.handle.thread().id() == thread::current().id() {
            // Called from inside the callback: the loop exits on its own
            return;
        }
        if worker.handle.join().is_err() {
            log::error!("Clock worker panicked");
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.stop();
    }
}
