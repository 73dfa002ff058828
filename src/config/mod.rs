//! Startup configuration loaded from the environment.
//!
//! Values are read once; nothing here is reloadable at runtime. A variable
//! that is present but unparsable is an error rather than silently falling
//! back to the default.

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BINANCE_FAPI_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Deployment environment name (`production`, `sandbox`, ...)
pub fn get_environment() -> String {
    environment_from(&process_env)
}

fn environment_from(source: &impl Fn(&str) -> Option<String>) -> String {
    source("ENVIRONMENT")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Thresholds for the accumulation rule
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Minimum 4h OI growth in percent
    pub oi_4h_threshold: f64,
    /// Minimum 24h OI growth in percent
    pub oi_24h_threshold: f64,
    /// Price growth must stay at or below `oi_growth * price_oi_ratio`
    pub price_oi_ratio: f64,
    /// Instruments with less current OI (in USDT) never alert
    pub min_oi_usdt: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            oi_4h_threshold: 7.0,
            oi_24h_threshold: 15.0,
            price_oi_ratio: 1.5,
            min_oi_usdt: 5_000_000.0,
        }
    }
}

/// Timing of the scan loop
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Target time between the starts of two consecutive cycles
    pub interval: Duration,
    /// Never sleep less than this between cycles
    pub min_sleep: Duration,
    /// Delay inserted between symbols within a cycle
    pub pacing: Duration,
    /// Minimum time between two alerts for the same symbol
    pub cooldown: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            min_sleep: Duration::from_secs(60),
            pacing: Duration::from_millis(150),
            cooldown: Duration::from_secs(3 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub environment: String,
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub binance_url: String,
    pub subscribers_file: PathBuf,
    /// Status server port; 0 disables it
    pub port: u16,
    pub request_timeout: Duration,
    pub detection: DetectionConfig,
    pub scan: ScanConfig,
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(process_env)
    }

    /// Build from any name lookup; `from_env` passes the process environment.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let telegram_token =
            env_str(&source, "TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;

        let defaults = DetectionConfig::default();
        let detection = DetectionConfig {
            oi_4h_threshold: env_parse(&source, "OI_4H_THRESHOLD", defaults.oi_4h_threshold)?,
            oi_24h_threshold: env_parse(&source, "OI_24H_THRESHOLD", defaults.oi_24h_threshold)?,
            price_oi_ratio: env_parse(&source, "PRICE_OI_RATIO", defaults.price_oi_ratio)?,
            min_oi_usdt: env_parse(&source, "MIN_OI_USDT", defaults.min_oi_usdt)?,
        };

        let cooldown_hours: u64 = env_parse(&source, "SIGNAL_COOLDOWN_HOURS", 3)?;
        let cooldown_secs = cooldown_hours
            .checked_mul(60 * 60)
            .ok_or_else(|| ConfigError::Invalid {
                name: "SIGNAL_COOLDOWN_HOURS",
                value: cooldown_hours.to_string(),
            })?;

        let scan = ScanConfig {
            interval: Duration::from_secs(env_parse(&source, "SCAN_INTERVAL_SECONDS", 60)?),
            min_sleep: Duration::from_secs(env_parse(&source, "SCAN_MIN_SLEEP_SECONDS", 60)?),
            pacing: Duration::from_millis(env_parse(&source, "SYMBOL_PACING_MS", 150)?),
            cooldown: Duration::from_secs(cooldown_secs),
        };

        Ok(Self {
            environment: environment_from(&source),
            telegram_token,
            telegram_api_url: env_str(&source, "TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            binance_url: env_str(&source, "BINANCE_FAPI_URL")
                .unwrap_or_else(|| DEFAULT_BINANCE_FAPI_URL.to_string()),
            subscribers_file: PathBuf::from(
                env_str(&source, "SUBSCRIBERS_FILE").unwrap_or_else(|| "users.json".to_string()),
            ),
            port: env_parse(&source, "PORT", 8080)?,
            request_timeout: Duration::from_secs(env_parse(
                &source,
                "REQUEST_TIMEOUT_SECONDS",
                5,
            )?),
            detection,
            scan,
        })
    }
}

fn env_str(source: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    source(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(
    source: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env_str(source, name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
