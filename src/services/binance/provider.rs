//! Binance market data provider implementation

use super::client::BinanceRestClient;
use super::messages::{KlineRow, OpenInterestHist, KLINE_CLOSE, KLINE_OPEN_TIME};
use crate::error::MarketDataError;
use crate::models::series::TimeSeriesPoint;
use crate::services::market_data::{SymbolUniverseProvider, TimeSeriesProvider};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::DateTime;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct BinanceMarketDataProvider {
    client: Arc<BinanceRestClient>,
    universe_retries: usize,
    universe_retry_delay: Duration,
}

impl BinanceMarketDataProvider {
    pub fn new(client: Arc<BinanceRestClient>) -> Self {
        Self {
            client,
            universe_retries: 3,
            universe_retry_delay: Duration::from_millis(500),
        }
    }

    /// Override the retry policy used when refreshing the symbol universe
    pub fn with_universe_retry(mut self, retries: usize, delay: Duration) -> Self {
        self.universe_retries = retries;
        self.universe_retry_delay = delay;
        self
    }
}

#[async_trait]
impl SymbolUniverseProvider for BinanceMarketDataProvider {
    async fn list_active_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.universe_retry_delay)
            .with_max_times(self.universe_retries);

        let info = (|| async { self.client.exchange_info().await })
            .retry(backoff)
            .when(MarketDataError::is_transient)
            .notify(|err: &MarketDataError, delay: Duration| {
                warn!(
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "exchangeInfo failed, retrying"
                );
            })
            .await?;

        let symbols: Vec<String> = info
            .symbols
            .into_iter()
            .filter(|s| s.is_active_usdt_perpetual())
            .map(|s| s.symbol)
            .collect();

        info!(count = symbols.len(), "Loaded {} active USDT perpetuals", symbols.len());
        Ok(symbols)
    }
}

#[async_trait]
impl TimeSeriesProvider for BinanceMarketDataProvider {
    async fn get_open_interest_series(
        &self,
        symbol: &str,
        points: usize,
    ) -> Result<Vec<TimeSeriesPoint>, MarketDataError> {
        let entries = self.client.open_interest_hist(symbol, points).await?;
        entries.iter().map(open_interest_point).collect()
    }

    async fn get_price_series(
        &self,
        symbol: &str,
        points: usize,
    ) -> Result<Vec<TimeSeriesPoint>, MarketDataError> {
        let rows = self.client.klines(symbol, points).await?;
        rows.iter().map(kline_close_point).collect()
    }
}

fn open_interest_point(entry: &OpenInterestHist) -> Result<TimeSeriesPoint, MarketDataError> {
    let value: f64 = entry.sum_open_interest_value.parse().map_err(|e| {
        MarketDataError::Decode(format!(
            "invalid sumOpenInterestValue '{}' for {}: {}",
            entry.sum_open_interest_value, entry.symbol, e
        ))
    })?;
    let timestamp = DateTime::from_timestamp_millis(entry.timestamp)
        .ok_or_else(|| MarketDataError::Decode(format!("invalid timestamp {}", entry.timestamp)))?;
    Ok(TimeSeriesPoint::new(timestamp, value))
}

fn kline_close_point(row: &KlineRow) -> Result<TimeSeriesPoint, MarketDataError> {
    let open_time = row
        .get(KLINE_OPEN_TIME)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| MarketDataError::Decode("kline without open time".to_string()))?;
    let close: f64 = row
        .get(KLINE_CLOSE)
        .and_then(|v| v.as_str())
        .ok_or_else(|| MarketDataError::Decode("kline without close price".to_string()))?
        .parse()
        .map_err(|e| MarketDataError::Decode(format!("invalid kline close: {}", e)))?;
    let timestamp = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| MarketDataError::Decode(format!("invalid kline open time {}", open_time)))?;
    Ok(TimeSeriesPoint::new(timestamp, close))
}
