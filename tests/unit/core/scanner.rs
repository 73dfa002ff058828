//! Unit tests for the scan loop against in-memory collaborators

use crate::fakes::{linear, FakeMarket, MemoryStore, RecordingNotifier};
use chrono::{Duration as TimeDelta, Utc};
use oi_scanner::config::{DetectionConfig, ScanConfig};
use oi_scanner::core::cooldown::NEVER_ALERTED;
use oi_scanner::core::scanner::{ScanOrchestrator, SymbolOutcome};
use oi_scanner::models::signal::SignalClassification;
use oi_scanner::subscribers::SubscriberRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn scan_config() -> ScanConfig {
    ScanConfig {
        interval: Duration::from_secs(60),
        min_sleep: Duration::from_secs(60),
        pacing: Duration::ZERO,
        cooldown: Duration::from_secs(3 * 60 * 60),
    }
}

fn accumulating() -> (Vec<f64>, Vec<f64>) {
    (
        linear(10_000_000.0, 11_800_000.0, 288),
        linear(100.0, 103.0, 288),
    )
}

fn quiet() -> (Vec<f64>, Vec<f64>) {
    (vec![20_000_000.0; 288], vec![100.0; 288])
}

struct Harness {
    market: Arc<FakeMarket>,
    notifier: Arc<RecordingNotifier>,
    scanner: ScanOrchestrator,
}

async fn harness(market: FakeMarket, subscribers: &[i64]) -> Harness {
    harness_with(market, subscribers, &scan_config()).await
}

async fn harness_with(market: FakeMarket, subscribers: &[i64], config: &ScanConfig) -> Harness {
    let market = Arc::new(market);
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = SubscriberRegistry::load(Arc::new(MemoryStore::with(subscribers)))
        .await
        .unwrap();
    let scanner = ScanOrchestrator::new(
        market.clone(),
        market.clone(),
        notifier.clone(),
        Arc::new(registry),
        DetectionConfig::default(),
        config,
    );
    Harness {
        market,
        notifier,
        scanner,
    }
}

fn running() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    std::mem::forget(tx);
    rx
}

#[tokio::test]
async fn alert_is_dispatched_to_subscribers_and_starts_cooldown() {
    let (oi, price) = accumulating();
    let mut h = harness(FakeMarket::new().with_symbol("ETHUSDT", &oi, &price), &[7, 3]).await;

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.symbols, 1);
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.alerts, 1);

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, vec![3, 7]);
    assert!(messages[0].1.contains("<b>ETHUSDT</b>"));
    assert!(messages[0].1.contains("Window: 24h"));

    assert_ne!(h.scanner.cooldown().last_alert("ETHUSDT"), NEVER_ALERTED);
}

#[tokio::test]
async fn symbol_in_cooldown_is_not_fetched() {
    let (oi, price) = accumulating();
    let mut h = harness(FakeMarket::new().with_symbol("BTCUSDT", &oi, &price), &[1]).await;

    // alerted one hour ago with a three hour cooldown
    h.scanner
        .cooldown()
        .record_alert("BTCUSDT", Utc::now() - TimeDelta::hours(1));

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.skipped_cooldown, 1);
    assert_eq!(report.evaluated, 0);
    assert_eq!(h.market.fetch_count(), 0);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn second_cycle_skips_freshly_alerted_symbol() {
    let (oi, price) = accumulating();
    let mut h = harness(FakeMarket::new().with_symbol("ETHUSDT", &oi, &price), &[1]).await;

    h.scanner.scan_cycle(&mut running()).await;
    let fetches_after_first = h.market.fetch_count();
    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(fetches_after_first, 2);
    assert_eq!(report.skipped_cooldown, 1);
    assert_eq!(h.market.fetch_count(), fetches_after_first);
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test]
async fn no_signal_does_not_start_cooldown() {
    let (oi, price) = quiet();
    let mut h = harness(FakeMarket::new().with_symbol("BNBUSDT", &oi, &price), &[1]).await;

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.alerts, 0);
    assert_eq!(h.scanner.cooldown().last_alert("BNBUSDT"), NEVER_ALERTED);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn fetch_failure_does_not_abort_cycle() {
    let (oi, price) = accumulating();
    let market = FakeMarket::new()
        .with_failing_symbol("BADUSDT")
        .with_symbol("ETHUSDT", &oi, &price);
    let mut h = harness(market, &[1]).await;

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.symbols, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.alerts, 1);
    assert!(h.market.fetched_symbols().contains(&"ETHUSDT".to_string()));
}

#[tokio::test]
async fn short_history_is_skipped_quietly() {
    let market = FakeMarket::new().with_symbol(
        "NEWUSDT",
        &linear(10_000_000.0, 20_000_000.0, 100),
        &vec![1.0; 100],
    );
    let mut h = harness(market, &[1]).await;

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.skipped_insufficient, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(report.alerts, 0);
}

#[tokio::test]
async fn failed_universe_refresh_reuses_previous_symbols() {
    let (oi, price) = quiet();
    let mut h = harness(FakeMarket::new().with_symbol("BNBUSDT", &oi, &price), &[]).await;

    h.scanner.scan_cycle(&mut running()).await;
    h.market.break_universe();
    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.symbols, 1);
    assert_eq!(report.evaluated, 1);
    assert_eq!(h.scanner.symbols().to_vec(), vec!["BNBUSDT".to_string()]);
    assert_eq!(h.market.fetch_count(), 4);
}

#[tokio::test]
async fn failed_first_refresh_scans_nothing() {
    let h = harness(FakeMarket::new(), &[]).await;
    let mut scanner = h.scanner;

    let report = scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.symbols, 0);
    assert_eq!(h.market.fetch_count(), 0);
}

#[tokio::test]
async fn shutdown_stops_cycle_between_symbols() {
    let (oi, price) = quiet();
    let mut h = harness(FakeMarket::new().with_symbol("BNBUSDT", &oi, &price), &[]).await;
    let (tx, mut rx) = watch::channel(false);
    tx.send(true).unwrap();

    let report = h.scanner.scan_cycle(&mut rx).await;

    assert!(report.interrupted);
    assert_eq!(h.market.fetch_count(), 0);
}

#[tokio::test]
async fn shutdown_cuts_pacing_delay_short() {
    let (oi, price) = quiet();
    let market = FakeMarket::new()
        .with_symbol("BNBUSDT", &oi, &price)
        .with_symbol("ADAUSDT", &oi, &price);
    let config = ScanConfig {
        pacing: Duration::from_secs(5),
        ..scan_config()
    };
    let mut h = harness_with(market, &[], &config).await;
    let (tx, mut rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
    });

    let started = std::time::Instant::now();
    let report = tokio::time::timeout(Duration::from_secs(2), h.scanner.scan_cycle(&mut rx))
        .await
        .expect("pacing delay ends on shutdown");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(report.interrupted);
    assert_eq!(report.evaluated, 1);
    assert_eq!(h.market.fetched_symbols(), vec!["BNBUSDT", "BNBUSDT"]);
}

#[tokio::test]
async fn price_is_not_fetched_below_oi_floor() {
    let market = FakeMarket::new().with_symbol(
        "DOGEUSDT",
        &linear(3_400_000.0, 4_000_000.0, 288),
        &vec![100.0; 288],
    );
    let mut h = harness(market, &[1]).await;

    let report = h.scanner.scan_cycle(&mut running()).await;

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.alerts, 0);
    assert_eq!(h.market.fetch_count(), 1);
}

#[tokio::test]
async fn price_is_not_fetched_for_short_open_interest_history() {
    let market = FakeMarket::new().with_symbol(
        "NEWUSDT",
        &linear(10_000_000.0, 20_000_000.0, 100),
        &vec![1.0; 288],
    );
    let h = harness(market, &[]).await;

    let outcome = h.scanner.process_symbol("NEWUSDT", Utc::now()).await;

    assert_eq!(outcome, SymbolOutcome::InsufficientHistory);
    assert_eq!(h.market.fetch_count(), 1);
}

#[tokio::test]
async fn process_symbol_reports_alert_evaluation() {
    let (oi, price) = accumulating();
    let h = harness(FakeMarket::new().with_symbol("ETHUSDT", &oi, &price), &[]).await;

    let outcome = h.scanner.process_symbol("ETHUSDT", Utc::now()).await;

    match outcome {
        SymbolOutcome::Alerted(evaluation) => {
            assert_eq!(evaluation.classification, SignalClassification::TwentyFourHour);
            assert_eq!(evaluation.symbol, "ETHUSDT");
        }
        other => panic!("expected alert, got {:?}", other),
    }
}

#[tokio::test]
async fn run_exits_on_shutdown() {
    let (oi, price) = quiet();
    let h = harness(FakeMarket::new().with_symbol("BNBUSDT", &oi, &price), &[]).await;
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(h.scanner.run(rx));
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scanner stops promptly")
        .unwrap();
    assert!(h.market.fetch_count() >= 2);
}
