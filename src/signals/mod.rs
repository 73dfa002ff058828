//! Accumulation signal detection.

pub mod alert;
pub mod engine;
pub mod growth;

pub use alert::format_alert;
pub use engine::{SignalEvaluator, WindowGrowth};
pub use growth::percent_change;
