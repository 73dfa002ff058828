//! Alert text rendering (Telegram HTML)

use crate::models::signal::SignalEvaluation;

/// Render a positive evaluation as an HTML message. `None` when nothing fired.
pub fn format_alert(evaluation: &SignalEvaluation) -> Option<String> {
    let window = evaluation.classification.window_label()?;

    Some(format!(
        "🚨 <b>OI ALERT</b>\n\n\
         <b>{symbol}</b>\n\
         ⏱ Window: {window}\n\n\
         OI 4h: {oi_4h:.1}%\n\
         OI 24h: {oi_24h:.1}%\n\n\
         Price 4h: {px_4h:.1}%\n\
         Price 24h: {px_24h:.1}%\n\n\
         Current price: {price:.4}\n\
         OI: {oi_m:.1}M USDT\n\n\
         <i>OI is rising faster than price → possible accumulation</i>",
        symbol = evaluation.symbol,
        oi_4h = evaluation.oi_growth_4h,
        oi_24h = evaluation.oi_growth_24h,
        px_4h = evaluation.price_growth_4h,
        px_24h = evaluation.price_growth_24h,
        price = evaluation.price_now,
        oi_m = evaluation.oi_now / 1e6,
    ))
}
