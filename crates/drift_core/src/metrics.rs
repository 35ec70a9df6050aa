//! Run counters and structured logging setup.
//!
//! Counters are atomics so one collector can be shared by configurations
//! running on different rayon workers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Aggregate statistics across every configuration of a benchmark.
#[derive(Debug)]
pub struct Metrics {
    tick_count: AtomicU64,
    window_count: AtomicU64,
    target_count: AtomicU64,
    pub counters: Mutex<HashMap<String, u64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a collector with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            window_count: AtomicU64::new(0),
            target_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records one controller tick.
    pub fn record_tick(&self, reached_target: bool) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        if reached_target {
            self.target_count.fetch_add(1, Ordering::Relaxed);
        }
        if tick % 100_000 == 0 {
            tracing::trace!(
                tick = tick,
                targets = self.target_count.load(Ordering::Relaxed),
                "Benchmark progress"
            );
        }
    }

    /// Records one sealed window.
    pub fn record_window(&self) {
        self.window_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Gets a named counter, zero if never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    /// Gets the total tick count.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Gets the number of sealed windows.
    #[must_use]
    pub fn window_count(&self) -> u64 {
        self.window_count.load(Ordering::Relaxed)
    }

    /// Gets the number of target-reach events.
    #[must_use]
    pub fn target_count(&self) -> u64 {
        self.target_count.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since the collector was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Ticks per second since the collector was created.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.tick_count() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` level. Calling it twice is harmless.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.window_count(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(false);
        metrics.record_tick(true);
        metrics.record_window();
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.target_count(), 1);
        assert_eq!(metrics.window_count(), 1);
    }

    #[test]
    fn test_increment_counter() {
        let metrics = Metrics::new();
        metrics.increment_counter("failed");
        metrics.increment_counter("failed");
        assert_eq!(metrics.counter("failed"), 2);
        assert_eq!(metrics.counter("missing"), 0);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
