//! Fixed-cadence cycle timing

use crate::config::ScanConfig;
use std::time::Duration;

/// Decides how long to sleep after a scan cycle.
///
/// Cycles start `interval` apart measured from the previous start; an
/// overrunning cycle is followed immediately, but the loop never sleeps
/// less than `min_sleep`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSchedule {
    interval: Duration,
    min_sleep: Duration,
}

impl CycleSchedule {
    pub fn new(interval: Duration, min_sleep: Duration) -> Self {
        Self { interval, min_sleep }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.interval, config.min_sleep)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep before the next cycle given the time the last one took
    pub fn sleep_after(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed).max(self.min_sleep)
    }
}
