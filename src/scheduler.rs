//! Fixed-step ticker driven by animation-frame timestamps
//!
//! Frames arrive at whatever rate the browser manages; the simulation always
//! advances in whole ticks of [`TICK_MS`]. Leftover time carries over to the
//! next frame.

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, TICK_MS};
use crate::sim::{SimulationState, tick};

/// Accumulator that turns frame timestamps into simulation ticks
#[derive(Debug, Clone)]
pub struct Ticker {
    tick_ms: f64,
    accumulator: f64,
    last_time: Option<f64>,
    running: bool,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::with_step(TICK_MS)
    }
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticker with a custom tick length in milliseconds
    pub fn with_step(tick_ms: f64) -> Self {
        Self {
            tick_ms,
            accumulator: 0.0,
            last_time: None,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.accumulator = 0.0;
            self.last_time = None;
        }
    }

    /// Stop ticking and drop any accumulated time
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
        self.last_time = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run the ticks owed up to `now_ms`; returns how many ran
    ///
    /// The first frame after [`start`](Self::start) runs exactly one tick.
    /// Gaps longer than [`MAX_FRAME_MS`] (a hidden tab, a debugger pause) are
    /// not caught up on, and at most [`MAX_SUBSTEPS`] ticks run per frame.
    pub fn advance(&mut self, now_ms: f64, state: &mut SimulationState) -> u32 {
        if !self.running {
            return 0;
        }

        let frame_ms = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => self.tick_ms,
        };
        self.last_time = Some(now_ms);
        self.accumulator += frame_ms;

        let mut ticks = 0;
        while self.accumulator >= self.tick_ms && ticks < MAX_SUBSTEPS {
            tick(state, 1.0);
            self.accumulator -= self.tick_ms;
            ticks += 1;

            if !state.is_running() {
                log::debug!("Simulation left the running phase; ticker stopping");
                self.stop();
                break;
            }
        }
        ticks
    }
}
