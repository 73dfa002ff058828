//! Binance USDⓈ-M Futures REST payloads

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub quote_asset: String,
    #[serde(default)]
    pub status: String,
}

impl SymbolInfo {
    /// Trading USDT-quoted perpetual
    pub fn is_active_usdt_perpetual(&self) -> bool {
        self.contract_type == "PERPETUAL" && self.quote_asset == "USDT" && self.status == "TRADING"
    }
}

/// Entry of `/futures/data/openInterestHist`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInterestHist {
    pub symbol: String,
    pub sum_open_interest: String,
    pub sum_open_interest_value: String,
    pub timestamp: i64,
}

/// `/fapi/v1/klines` rows are positional arrays:
/// `[open_time, open, high, low, close, volume, close_time, ...]`
pub type KlineRow = Vec<serde_json::Value>;

pub const KLINE_OPEN_TIME: usize = 0;
pub const KLINE_CLOSE: usize = 4;
