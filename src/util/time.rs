//! Time utilities for the fight simulation

use std::time::{Duration, Instant};

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // 60 ticks per second
pub const SNAPSHOT_TPS: u32 = 30; // 30 snapshots per second

/// Delta time for one fixed tick at the given rate (in seconds)
pub fn tick_delta(tps: u32) -> f64 {
    1.0 / tps.max(1) as f64
}

/// Wall-clock interval between ticks at the given rate
pub fn tick_duration(tps: u32) -> Duration {
    Duration::from_micros(1_000_000 / tps.max(1) as u64)
}

/// Snapshot interval expressed in simulation ticks
pub fn snapshot_interval(tps: u32) -> u32 {
    (tps / SNAPSHOT_TPS).max(1)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_delta_matches_rate() {
        assert!((tick_delta(60) - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(tick_duration(50), Duration::from_millis(20));
    }

    #[test]
    fn snapshot_interval_never_zero() {
        assert_eq!(snapshot_interval(60), 2);
        assert_eq!(snapshot_interval(10), 1);
    }
}
