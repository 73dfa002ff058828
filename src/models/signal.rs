use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which window, if any, triggered an accumulation signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalClassification {
    None,
    FourHour,
    TwentyFourHour,
}

impl SignalClassification {
    pub fn is_signal(self) -> bool {
        !matches!(self, SignalClassification::None)
    }

    /// Short window label used in alerts
    pub fn window_label(self) -> Option<&'static str> {
        match self {
            SignalClassification::None => None,
            SignalClassification::FourHour => Some("4h"),
            SignalClassification::TwentyFourHour => Some("24h"),
        }
    }
}

impl fmt::Display for SignalClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.window_label().unwrap_or("none"))
    }
}

/// Result of evaluating one symbol, with every figure the alert needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub symbol: String,
    pub classification: SignalClassification,
    pub oi_growth_4h: f64,
    pub oi_growth_24h: f64,
    pub price_growth_4h: f64,
    pub price_growth_24h: f64,
    pub oi_now: f64,
    pub price_now: f64,
    pub evaluated_at: DateTime<Utc>,
}
