//! Shared data models spanning the engine layers.

pub mod series;
pub mod signal;

pub use series::{TimeSeriesPoint, WINDOW_24H_POINTS, WINDOW_4H_POINTS};
pub use signal::{SignalClassification, SignalEvaluation};
