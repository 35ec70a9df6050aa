//! Time sources for the benchmark loop.

use std::time::{Duration, Instant};

pub trait Clock {
    /// Time since the run started.
    fn elapsed(&self) -> Duration;

    /// Called once after every tick.
    fn advance(&mut self) {}
}

/// Real time. The production default.
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Simulated time: every tick takes exactly `step`.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: Duration,
    elapsed: Duration,
}

impl FixedStepClock {
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            elapsed: Duration::ZERO,
        }
    }
}

impl Clock for FixedStepClock {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn advance(&mut self) {
        self.elapsed += self.step;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    Wall,
    FixedStep(Duration),
}

impl ClockMode {
    #[must_use]
    pub fn start(self) -> Box<dyn Clock> {
        match self {
            ClockMode::Wall => Box::new(WallClock::start()),
            ClockMode::FixedStep(step) => Box::new(FixedStepClock::new(step)),
        }
    }
}
