//! Market data interfaces consumed by the scan loop.

use crate::error::MarketDataError;
use crate::models::series::TimeSeriesPoint;
use async_trait::async_trait;

/// Source of the tradable symbol universe
#[async_trait]
pub trait SymbolUniverseProvider: Send + Sync {
    /// Currently tradable USDT-margined perpetual symbols
    async fn list_active_symbols(&self) -> Result<Vec<String>, MarketDataError>;
}

/// 5-minute series by symbol, oldest first
#[async_trait]
pub trait TimeSeriesProvider: Send + Sync {
    /// Open interest value (USDT) history
    async fn get_open_interest_series(
        &self,
        symbol: &str,
        points: usize,
    ) -> Result<Vec<TimeSeriesPoint>, MarketDataError>;

    /// Kline close price history
    async fn get_price_series(
        &self,
        symbol: &str,
        points: usize,
    ) -> Result<Vec<TimeSeriesPoint>, MarketDataError>;
}
