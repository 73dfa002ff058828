//! Open-interest accumulation scanner for perpetual futures.
//!
//! - `signals`: growth math, two-window classification and alert text
//! - `core`: cooldown gating, the scan loop and its status server
//! - `services`: Binance market data and Telegram delivery
//! - `subscribers`: the shared recipient set and its persistence

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod subscribers;
