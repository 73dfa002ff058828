//! Recipients of accumulation alerts.
//!
//! The registry is shared between the scan loop (reads when dispatching)
//! and the bot command handler (writes on `/start` and `/stop`). Every
//! mutation is persisted before the lock is released.

pub mod store;

pub use store::{JsonFileStore, SubscriberStore};

use crate::error::StoreError;
use crate::metrics::Metrics;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

pub struct SubscriberRegistry {
    subscribers: RwLock<HashSet<i64>>,
    store: Arc<dyn SubscriberStore>,
    metrics: Option<Arc<Metrics>>,
}

impl SubscriberRegistry {
    /// Load the persisted set once at startup
    pub async fn load(store: Arc<dyn SubscriberStore>) -> Result<Self, StoreError> {
        let subscribers = store.load().await?;
        info!(count = subscribers.len(), "Loaded {} subscribers", subscribers.len());
        Ok(Self {
            subscribers: RwLock::new(subscribers),
            store,
            metrics: None,
        })
    }

    /// Keep the subscriber gauge in step with the set
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.subscribers.set(self.subscribers.get_mut().len() as i64);
        self.metrics = Some(metrics);
        self
    }

    /// Add a chat. Returns `true` if it was not subscribed before.
    pub async fn subscribe(&self, chat_id: i64) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let added = subscribers.insert(chat_id);
        if added {
            self.persist(&subscribers).await;
        }
        added
    }

    /// Remove a chat. Returns `true` if it was subscribed.
    pub async fn unsubscribe(&self, chat_id: i64) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let removed = subscribers.remove(&chat_id);
        if removed {
            self.persist(&subscribers).await;
        }
        removed
    }

    /// Snapshot of current recipients, sorted
    pub async fn recipients(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.subscribers.read().await.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }

    // In-memory state stays authoritative if the write fails.
    async fn persist(&self, subscribers: &HashSet<i64>) {
        if let Some(ref metrics) = self.metrics {
            metrics.subscribers.set(subscribers.len() as i64);
        }
        if let Err(e) = self.store.save(subscribers).await {
            error!(error = %e, "Failed to persist subscribers");
        }
    }
}
