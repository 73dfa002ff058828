//! Outbound notification interface.

use async_trait::async_trait;

/// Outcome of a broadcast
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// Recipients that could not be reached, with the reason
    pub failed: Vec<(i64, String)>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to every recipient.
    ///
    /// A failure for one recipient must not stop delivery to the rest.
    async fn broadcast(&self, recipients: &[i64], text: &str) -> DeliveryReport;
}
