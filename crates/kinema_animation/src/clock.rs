//! Virtual clock
//!
//! Simulated time that only moves when explicitly advanced. The scheduler
//! owns one clock; wall-clock time is never consulted.

use std::time::Duration;

/// Explicitly advanced simulated time, starting at zero
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: Duration,
    frames: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated instant, measured from clock creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of frames stepped so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Move time forward by one frame of length `step`, returning the new instant
    pub fn step(&mut self, step: Duration) -> Duration {
        self.now += step;
        self.frames += 1;
        self.now
    }

    /// Rewind to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
