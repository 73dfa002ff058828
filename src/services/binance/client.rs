//! Thin REST client for the Binance Futures public endpoints

use super::messages::{ExchangeInfo, KlineRow, OpenInterestHist};
use crate::error::MarketDataError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 5-minute granularity used for every history request
pub const PERIOD_5M: &str = "5m";

pub struct BinanceRestClient {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceRestClient {
    /// Client with a fixed per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn exchange_info(&self) -> Result<ExchangeInfo, MarketDataError> {
        self.get_json("/fapi/v1/exchangeInfo", &[]).await
    }

    pub async fn open_interest_hist(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<OpenInterestHist>, MarketDataError> {
        self.get_json(
            "/futures/data/openInterestHist",
            &[
                ("symbol", symbol.to_string()),
                ("period", PERIOD_5M.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn klines(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<KlineRow>, MarketDataError> {
        self.get_json(
            "/fapi/v1/klines",
            &[
                ("symbol", symbol.to_string()),
                ("interval", PERIOD_5M.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint = endpoint, query = ?query, "Binance GET {}", endpoint);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::Decode(format!("{}: {}", endpoint, e)))
    }
}
