//! Unit tests for alert text

use chrono::Utc;
use oi_scanner::models::signal::{SignalClassification, SignalEvaluation};
use oi_scanner::signals::alert::format_alert;

fn evaluation(classification: SignalClassification) -> SignalEvaluation {
    SignalEvaluation {
        symbol: "ETHUSDT".to_string(),
        classification,
        oi_growth_4h: 2.5566,
        oi_growth_24h: 18.0,
        price_growth_4h: 0.42,
        price_growth_24h: 3.0,
        oi_now: 11_800_000.0,
        price_now: 103.0,
        evaluated_at: Utc::now(),
    }
}

#[test]
fn alert_contains_all_figures() {
    let text = format_alert(&evaluation(SignalClassification::TwentyFourHour)).unwrap();

    assert!(text.starts_with("🚨 <b>OI ALERT</b>"));
    assert!(text.contains("<b>ETHUSDT</b>"));
    assert!(text.contains("Window: 24h"));
    assert!(text.contains("OI 4h: 2.6%"));
    assert!(text.contains("OI 24h: 18.0%"));
    assert!(text.contains("Price 4h: 0.4%"));
    assert!(text.contains("Price 24h: 3.0%"));
    assert!(text.contains("Current price: 103.0000"));
    assert!(text.contains("OI: 11.8M USDT"));
    assert!(text.contains("possible accumulation"));
}

#[test]
fn window_label_follows_classification() {
    let text = format_alert(&evaluation(SignalClassification::FourHour)).unwrap();
    assert!(text.contains("Window: 4h"));
}

#[test]
fn no_alert_without_signal() {
    assert!(format_alert(&evaluation(SignalClassification::None)).is_none());
}
