//! OI Scanner
//!
//! Scans Binance USDT perpetuals for open interest outpacing price and
//! pushes alerts to subscribed Telegram chats. Runs the scan loop, the bot
//! command handler and the status server side by side until Ctrl-C.

use dotenvy::dotenv;
use oi_scanner::config::ScannerConfig;
use oi_scanner::core::http::{start_server, AppState};
use oi_scanner::core::scanner::ScanOrchestrator;
use oi_scanner::logging;
use oi_scanner::metrics::Metrics;
use oi_scanner::services::binance::{BinanceMarketDataProvider, BinanceRestClient};
use oi_scanner::services::telegram::{CommandHandler, TelegramClient};
use oi_scanner::subscribers::{JsonFileStore, SubscriberRegistry};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    // Misconfiguration is the only fatal error; fail before anything starts.
    let config = ScannerConfig::from_env()?;
    info!(environment = %config.environment, "Starting OI Scanner");
    info!(
        oi_4h_threshold = config.detection.oi_4h_threshold,
        oi_24h_threshold = config.detection.oi_24h_threshold,
        price_oi_ratio = config.detection.price_oi_ratio,
        min_oi_usdt = config.detection.min_oi_usdt,
        cooldown_secs = config.scan.cooldown.as_secs(),
        "Detection settings"
    );

    let metrics = Arc::new(Metrics::new()?);

    let store = Arc::new(JsonFileStore::new(config.subscribers_file.clone()));
    let subscribers = Arc::new(
        SubscriberRegistry::load(store)
            .await?
            .with_metrics(metrics.clone()),
    );

    let binance = Arc::new(BinanceRestClient::new(
        config.binance_url.clone(),
        config.request_timeout,
    )?);
    let provider = Arc::new(BinanceMarketDataProvider::new(binance));

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
        config.request_timeout,
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scanner = ScanOrchestrator::new(
        provider.clone(),
        provider,
        telegram.clone(),
        subscribers.clone(),
        config.detection.clone(),
        &config.scan,
    )
    .with_metrics(metrics.clone());
    let scanner_handle = tokio::spawn(scanner.run(shutdown_rx.clone()));

    let commands = CommandHandler::new(telegram, subscribers);
    let commands_handle = tokio::spawn(commands.run(shutdown_rx.clone()));

    let server_handle = if config.port > 0 {
        let state = AppState::new(metrics.clone());
        let port = config.port;
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = start_server(port, state, rx).await {
                error!(error = %e, "Status server error");
            }
        }))
    } else {
        info!("Status server disabled (PORT=0)");
        None
    };

    signal::ctrl_c().await?;
    info!("Shutting down...");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scanner_handle.await {
        error!(error = %e, "Scanner task failed");
    }
    if let Err(e) = commands_handle.await {
        error!(error = %e, "Command handler task failed");
    }
    if let Some(handle) = server_handle {
        let _ = handle.await;
    }

    info!("OI Scanner stopped");
    Ok(())
}
