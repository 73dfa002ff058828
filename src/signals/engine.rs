//! Two-window accumulation classifier.
//!
//! A symbol signals when open interest grows past a threshold while price
//! growth stays within `price_oi_ratio` of it. The 4h window is checked
//! before the 24h window and wins when both hold.

use crate::config::DetectionConfig;
use crate::error::EvaluationError;
use crate::models::series::{TimeSeriesPoint, WINDOW_24H_POINTS, WINDOW_4H_POINTS};
use crate::models::signal::{SignalClassification, SignalEvaluation};
use crate::signals::growth::percent_change;
use chrono::Utc;

/// Current value and growth over both windows for one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGrowth {
    pub now: f64,
    pub growth_4h: f64,
    pub growth_24h: f64,
}

impl WindowGrowth {
    /// Caller guarantees `series.len() >= WINDOW_24H_POINTS`.
    fn from_series(series: &[TimeSeriesPoint]) -> Self {
        let len = series.len();
        let now = series[len - 1].value;
        let ago_4h = series[len - WINDOW_4H_POINTS].value;
        let ago_24h = series[len - WINDOW_24H_POINTS].value;
        Self {
            now,
            growth_4h: percent_change(ago_4h, now),
            growth_24h: percent_change(ago_24h, now),
        }
    }
}

pub struct SignalEvaluator {
    config: DetectionConfig,
}

impl SignalEvaluator {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Classify one symbol from its OI and close-price series.
    ///
    /// Both series must be oldest-first at 5-minute spacing and hold at
    /// least 288 points; the 24h requirement gates the 4h window too.
    pub fn evaluate(
        &self,
        symbol: &str,
        open_interest: &[TimeSeriesPoint],
        price: &[TimeSeriesPoint],
    ) -> Result<SignalEvaluation, EvaluationError> {
        let available = open_interest.len().min(price.len());
        if available < WINDOW_24H_POINTS {
            return Err(EvaluationError::InsufficientHistory {
                available,
                required: WINDOW_24H_POINTS,
            });
        }

        let oi = WindowGrowth::from_series(open_interest);
        let px = WindowGrowth::from_series(price);

        let classification = if oi.now < self.config.min_oi_usdt {
            SignalClassification::None
        } else {
            self.classify(&oi, &px)
        };

        Ok(SignalEvaluation {
            symbol: symbol.to_string(),
            classification,
            oi_growth_4h: oi.growth_4h,
            oi_growth_24h: oi.growth_24h,
            price_growth_4h: px.growth_4h,
            price_growth_24h: px.growth_24h,
            oi_now: oi.now,
            price_now: px.now,
            evaluated_at: Utc::now(),
        })
    }

    fn classify(&self, oi: &WindowGrowth, price: &WindowGrowth) -> SignalClassification {
        let signal_4h =
            self.window_fires(oi.growth_4h, price.growth_4h, self.config.oi_4h_threshold);
        let signal_24h =
            self.window_fires(oi.growth_24h, price.growth_24h, self.config.oi_24h_threshold);

        if signal_4h {
            SignalClassification::FourHour
        } else if signal_24h {
            SignalClassification::TwentyFourHour
        } else {
            SignalClassification::None
        }
    }

    fn window_fires(&self, oi_growth: f64, price_growth: f64, threshold: f64) -> bool {
        oi_growth >= threshold && price_growth <= oi_growth * self.config.price_oi_ratio
    }
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}
