//! Ordering ticks and wall-clock time seen by every operation

use serde::{Deserialize, Serialize};

/// Voting windows are bounded in ticks; the timelock delay and grace window
/// in wall-clock seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub tick: u64,
    pub time: u64,
}

impl Clock {
    pub fn new(tick: u64, time: u64) -> Self {
        Self { tick, time }
    }

    pub fn advance_ticks(&mut self, ticks: u64) {
        self.tick = self.tick.saturating_add(ticks);
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.time = self.time.saturating_add(seconds);
    }
}
