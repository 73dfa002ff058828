//! Scan loop: universe refresh, cooldown gating, evaluation and dispatch.
//!
//! Symbols are processed one at a time with a pacing delay in between so
//! the exchange's request-rate limits hold. Failures for one symbol are
//! logged and never abort the cycle.

use crate::config::{DetectionConfig, ScanConfig};
use crate::core::cooldown::CooldownTracker;
use crate::core::scheduler::CycleSchedule;
use crate::error::{EvaluationError, MarketDataError};
use crate::metrics::Metrics;
use crate::models::series::WINDOW_24H_POINTS;
use crate::models::signal::SignalEvaluation;
use crate::services::market_data::{SymbolUniverseProvider, TimeSeriesProvider};
use crate::services::notifier::Notifier;
use crate::signals::alert::format_alert;
use crate::signals::engine::SignalEvaluator;
use crate::subscribers::SubscriberRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What happened to one symbol in a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// Still cooling down; nothing was fetched
    SkippedCooldown,
    /// Fewer than 288 points available
    InsufficientHistory,
    FetchFailed,
    /// Evaluated without a signal
    NoSignal,
    Alerted(SignalEvaluation),
}

/// Tally of one scan cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub symbols: usize,
    pub evaluated: usize,
    pub skipped_cooldown: usize,
    pub skipped_insufficient: usize,
    pub errors: usize,
    pub alerts: usize,
    /// Cycle stopped early on shutdown
    pub interrupted: bool,
}

impl ScanReport {
    fn record(&mut self, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::SkippedCooldown => self.skipped_cooldown += 1,
            SymbolOutcome::InsufficientHistory => self.skipped_insufficient += 1,
            SymbolOutcome::FetchFailed => self.errors += 1,
            SymbolOutcome::NoSignal => self.evaluated += 1,
            SymbolOutcome::Alerted(_) => {
                self.evaluated += 1;
                self.alerts += 1;
            }
        }
    }
}

pub struct ScanOrchestrator {
    universe: Arc<dyn SymbolUniverseProvider>,
    series: Arc<dyn TimeSeriesProvider>,
    notifier: Arc<dyn Notifier>,
    subscribers: Arc<SubscriberRegistry>,
    evaluator: SignalEvaluator,
    cooldown: CooldownTracker,
    schedule: CycleSchedule,
    pacing: Duration,
    symbols: Vec<String>,
    metrics: Option<Arc<Metrics>>,
}

impl ScanOrchestrator {
    pub fn new(
        universe: Arc<dyn SymbolUniverseProvider>,
        series: Arc<dyn TimeSeriesProvider>,
        notifier: Arc<dyn Notifier>,
        subscribers: Arc<SubscriberRegistry>,
        detection: DetectionConfig,
        scan: &ScanConfig,
    ) -> Self {
        Self {
            universe,
            series,
            notifier,
            subscribers,
            evaluator: SignalEvaluator::new(detection),
            cooldown: CooldownTracker::new(scan.cooldown),
            schedule: CycleSchedule::from_config(scan),
            pacing: scan.pacing,
            symbols: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Symbol universe used by the last cycle
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Run cycles until `shutdown` flips to true
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.schedule.interval().as_secs(),
            "Scanner: started"
        );

        while !*shutdown.borrow() {
            let started = Instant::now();
            let report = self.scan_cycle(&mut shutdown).await;
            let elapsed = started.elapsed();

            if let Some(ref metrics) = self.metrics {
                metrics.scan_cycles_total.inc();
                metrics.scan_duration_seconds.observe(elapsed.as_secs_f64());
                metrics
                    .last_scan_timestamp_seconds
                    .set(Utc::now().timestamp() as f64);
            }

            let sleep = self.schedule.sleep_after(elapsed);
            info!(
                symbols = report.symbols,
                evaluated = report.evaluated,
                skipped_cooldown = report.skipped_cooldown,
                skipped_insufficient = report.skipped_insufficient,
                errors = report.errors,
                alerts = report.alerts,
                elapsed_ms = elapsed.as_millis() as u64,
                sleep_secs = sleep.as_secs(),
                "Scanner: cycle finished"
            );

            if report.interrupted {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        info!("Scanner: stopped");
    }

    /// One pass over the symbol universe. Stops early, pacing delay
    /// included, once `shutdown` flips to true.
    pub async fn scan_cycle(&mut self, shutdown: &mut watch::Receiver<bool>) -> ScanReport {
        self.refresh_universe().await;
        info!(symbols = self.symbols.len(), "Scanner: cycle started");

        let mut report = ScanReport {
            symbols: self.symbols.len(),
            ..ScanReport::default()
        };

        for (i, symbol) in self.symbols.iter().enumerate() {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }

            let outcome = self.process_symbol(symbol, Utc::now()).await;
            report.record(&outcome);

            let is_last = i + 1 == self.symbols.len();
            if !is_last && !self.pacing.is_zero() {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            report.interrupted = true;
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.pacing) => {}
                }
            }
        }

        report
    }

    /// Gate, fetch, evaluate and, on a signal, alert for one symbol
    pub async fn process_symbol(&self, symbol: &str, now: DateTime<Utc>) -> SymbolOutcome {
        if !self.cooldown.should_evaluate(symbol, now) {
            debug!(symbol = %symbol, "Scanner: {} in cooldown, skipping", symbol);
            if let Some(ref metrics) = self.metrics {
                metrics.symbols_skipped_cooldown_total.inc();
            }
            return SymbolOutcome::SkippedCooldown;
        }

        let oi = match self
            .series
            .get_open_interest_series(symbol, WINDOW_24H_POINTS)
            .await
        {
            Ok(oi) => oi,
            Err(e) => return self.fetch_failed(symbol, &e),
        };

        // Price is only fetched for symbols that can still signal.
        if oi.len() < WINDOW_24H_POINTS {
            debug!(
                symbol = %symbol,
                available = oi.len(),
                "Scanner: not enough OI history for {}",
                symbol
            );
            return SymbolOutcome::InsufficientHistory;
        }
        let oi_now = oi.last().map_or(0.0, |p| p.value);
        if oi_now < self.evaluator.config().min_oi_usdt {
            debug!(symbol = %symbol, oi_now = oi_now, "Scanner: {} below OI floor", symbol);
            if let Some(ref metrics) = self.metrics {
                metrics.symbols_evaluated_total.inc();
            }
            return SymbolOutcome::NoSignal;
        }

        let price = match self.series.get_price_series(symbol, WINDOW_24H_POINTS).await {
            Ok(price) => price,
            Err(e) => return self.fetch_failed(symbol, &e),
        };

        let evaluation = match self.evaluator.evaluate(symbol, &oi, &price) {
            Ok(evaluation) => evaluation,
            Err(EvaluationError::InsufficientHistory { available, required }) => {
                debug!(
                    symbol = %symbol,
                    available = available,
                    required = required,
                    "Scanner: not enough history for {}",
                    symbol
                );
                return SymbolOutcome::InsufficientHistory;
            }
        };

        if let Some(ref metrics) = self.metrics {
            metrics.symbols_evaluated_total.inc();
        }

        debug!(
            symbol = %symbol,
            oi_growth_4h = evaluation.oi_growth_4h,
            oi_growth_24h = evaluation.oi_growth_24h,
            price_growth_4h = evaluation.price_growth_4h,
            price_growth_24h = evaluation.price_growth_24h,
            oi_now = evaluation.oi_now,
            classification = %evaluation.classification,
            "Scanner: evaluated {}",
            symbol
        );

        if !evaluation.classification.is_signal() {
            return SymbolOutcome::NoSignal;
        }

        self.dispatch(&evaluation).await;
        self.cooldown.record_alert(symbol, now);
        SymbolOutcome::Alerted(evaluation)
    }

    fn fetch_failed(&self, symbol: &str, error: &MarketDataError) -> SymbolOutcome {
        warn!(symbol = %symbol, error = %error, "Scanner: fetch failed for {}", symbol);
        if let Some(ref metrics) = self.metrics {
            metrics.fetch_errors_total.inc();
        }
        SymbolOutcome::FetchFailed
    }

    async fn dispatch(&self, evaluation: &SignalEvaluation) {
        let Some(text) = format_alert(evaluation) else {
            return;
        };

        let recipients = self.subscribers.recipients().await;
        let report = self.notifier.broadcast(&recipients, &text).await;

        if let Some(ref metrics) = self.metrics {
            metrics.alerts_total.inc();
        }

        info!(
            symbol = %evaluation.symbol,
            window = %evaluation.classification,
            oi_growth_4h = evaluation.oi_growth_4h,
            oi_growth_24h = evaluation.oi_growth_24h,
            delivered = report.delivered,
            failed = report.failed.len(),
            "Scanner: accumulation alert for {} ({})",
            evaluation.symbol,
            evaluation.classification
        );
    }

    // Keeps the previous universe when the refresh fails.
    async fn refresh_universe(&mut self) {
        match self.universe.list_active_symbols().await {
            Ok(symbols) => {
                self.symbols = symbols;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    previous = self.symbols.len(),
                    "Scanner: universe refresh failed, reusing previous list"
                );
            }
        }
        if let Some(ref metrics) = self.metrics {
            metrics.universe_size.set(self.symbols.len() as i64);
        }
    }
}
