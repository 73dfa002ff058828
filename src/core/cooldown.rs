//! Per-symbol alert cooldown

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Last-alert time reported for symbols that never alerted
pub const NEVER_ALERTED: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Suppresses re-evaluation of a symbol for `cooldown` after it alerts.
///
/// Each call takes the lock once, so reads and writes for a symbol never
/// interleave even if symbols are scanned concurrently.
pub struct CooldownTracker {
    cooldown: TimeDelta,
    last_alert: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            last_alert: RwLock::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }

    /// Time of the last alert for `symbol`, or [`NEVER_ALERTED`]
    pub fn last_alert(&self, symbol: &str) -> DateTime<Utc> {
        let map = self.last_alert.read().unwrap_or_else(|e| e.into_inner());
        map.get(symbol).copied().unwrap_or(NEVER_ALERTED)
    }

    /// False while `symbol` is still cooling down at `now`
    pub fn should_evaluate(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_alert(symbol)) >= self.cooldown
    }

    /// Start the cooldown for `symbol`. Only call after a positive signal.
    pub fn record_alert(&self, symbol: &str, now: DateTime<Utc>) {
        let mut map = self.last_alert.write().unwrap_or_else(|e| e.into_inner());
        map.insert(symbol.to_string(), now);
    }

    /// Symbols currently tracked (alerted at least once)
    pub fn tracked(&self) -> usize {
        self.last_alert.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
