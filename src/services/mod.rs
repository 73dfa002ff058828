//! External collaborators: market data in, notifications out.

pub mod binance;
pub mod market_data;
pub mod notifier;
pub mod telegram;

pub use market_data::{SymbolUniverseProvider, TimeSeriesProvider};
pub use notifier::{DeliveryReport, Notifier};
