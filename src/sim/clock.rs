//! Fixed-interval clocks
//!
//! A `Ticker` turns variable frame deltas into whole ticks. It is armed with
//! the session generation it was started for, and every tick it emits carries
//! that generation so the engine can drop ticks from a superseded session.

use crate::consts::MAX_FRAME_DT;

/// One discrete step, stamped with the session it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: f32,
    max_substeps: u32,
    accumulator: f32,
    armed: Option<u64>,
}

impl Ticker {
    pub fn new(interval: f32, max_substeps: u32) -> Self {
        Self {
            interval,
            max_substeps,
            accumulator: 0.0,
            armed: None,
        }
    }

    /// Start ticking for `generation`. Re-arming for the same generation
    /// keeps the accumulated time; a new generation starts from zero.
    pub fn arm(&mut self, generation: u64) {
        if self.armed != Some(generation) {
            self.armed = Some(generation);
            self.accumulator = 0.0;
        }
    }

    pub fn disarm(&mut self) {
        self.armed = None;
        self.accumulator = 0.0;
    }

    /// Feed elapsed seconds, get the ticks that are due
    pub fn advance(&mut self, dt: f32) -> Vec<Tick> {
        let Some(generation) = self.armed else {
            return Vec::new();
        };

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT.max(self.interval));

        let mut ticks = Vec::new();
        while self.accumulator >= self.interval && (ticks.len() as u32) < self.max_substeps {
            ticks.push(Tick { generation });
            self.accumulator -= self.interval;
        }
        ticks
    }
}
