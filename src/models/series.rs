use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sampling interval of every series the scanner consumes
pub const SAMPLE_INTERVAL_MINUTES: i64 = 5;

/// Points in the 4h window at 5-minute sampling
pub const WINDOW_4H_POINTS: usize = 48;

/// Points in the 24h window at 5-minute sampling
pub const WINDOW_24H_POINTS: usize = 288;

/// One 5-minute observation: OI value in USDT, or a kline close price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Build an evenly spaced, oldest-first series ending at `end`.
pub fn series_from_values(values: &[f64], end: DateTime<Utc>) -> Vec<TimeSeriesPoint> {
    let n = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let steps_back = n - 1 - i as i64;
            TimeSeriesPoint::new(
                end - Duration::minutes(steps_back * SAMPLE_INTERVAL_MINUTES),
                value,
            )
        })
        .collect()
}
