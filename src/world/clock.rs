//! Wall-clock pacing
//!
//! Gameplay only ever sees whole ticks. The clock turns elapsed real time
//! into a count of ticks due and a `tick_percent` for interpolated drawing.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TickClock {
    tick_duration: Duration,
    accumulated: Duration,
}

impl TickClock {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration: tick_duration.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
        }
    }

    /// Add elapsed time; returns how many ticks are now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut due = 0;
        while self.accumulated >= self.tick_duration {
            self.accumulated -= self.tick_duration;
            due += 1;
        }
        due
    }

    /// Progress through the current tick, in `[0, 1)`
    pub fn tick_percent(&self) -> f64 {
        self.accumulated.as_secs_f64() / self.tick_duration.as_secs_f64()
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
