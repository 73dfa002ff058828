//! Prometheus metrics for the scan loop and status server

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub scan_cycles_total: IntCounter,
    pub symbols_evaluated_total: IntCounter,
    pub symbols_skipped_cooldown_total: IntCounter,
    pub fetch_errors_total: IntCounter,
    pub alerts_total: IntCounter,
    pub scan_duration_seconds: Histogram,
    pub universe_size: IntGauge,
    pub subscribers: IntGauge,
    pub last_scan_timestamp_seconds: Gauge,
    pub http_requests_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scan_cycles_total = IntCounter::with_opts(Opts::new(
            "oi_scan_cycles_total",
            "Completed scan cycles",
        ))?;
        let symbols_evaluated_total = IntCounter::with_opts(Opts::new(
            "oi_symbols_evaluated_total",
            "Symbols fetched and evaluated",
        ))?;
        let symbols_skipped_cooldown_total = IntCounter::with_opts(Opts::new(
            "oi_symbols_skipped_cooldown_total",
            "Symbols skipped because they alerted recently",
        ))?;
        let fetch_errors_total = IntCounter::with_opts(Opts::new(
            "oi_fetch_errors_total",
            "Market data fetch failures",
        ))?;
        let alerts_total = IntCounter::with_opts(Opts::new(
            "oi_alerts_total",
            "Accumulation alerts dispatched",
        ))?;
        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("oi_scan_duration_seconds", "Wall-clock duration of a scan cycle")
                .buckets(vec![5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        let universe_size = IntGauge::with_opts(Opts::new(
            "oi_universe_size",
            "Symbols in the current scan universe",
        ))?;
        let subscribers = IntGauge::with_opts(Opts::new(
            "oi_subscribers",
            "Chats subscribed to alerts",
        ))?;
        let last_scan_timestamp_seconds = Gauge::with_opts(Opts::new(
            "oi_last_scan_timestamp_seconds",
            "Unix time at which the last scan cycle finished",
        ))?;
        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "Requests served by the status server",
        ))?;

        registry.register(Box::new(scan_cycles_total.clone()))?;
        registry.register(Box::new(symbols_evaluated_total.clone()))?;
        registry.register(Box::new(symbols_skipped_cooldown_total.clone()))?;
        registry.register(Box::new(fetch_errors_total.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;
        registry.register(Box::new(universe_size.clone()))?;
        registry.register(Box::new(subscribers.clone()))?;
        registry.register(Box::new(last_scan_timestamp_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            scan_cycles_total,
            symbols_evaluated_total,
            symbols_skipped_cooldown_total,
            fetch_errors_total,
            alerts_total,
            scan_duration_seconds,
            universe_size,
            subscribers,
            last_scan_timestamp_seconds,
            http_requests_total,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
