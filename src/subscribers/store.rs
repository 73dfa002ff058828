//! Subscriber persistence

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn load(&self) -> Result<HashSet<i64>, StoreError>;
    async fn save(&self, subscribers: &HashSet<i64>) -> Result<(), StoreError>;
}

/// Chat ids stored as a JSON array in a single file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubscriberStore for JsonFileStore {
    /// A missing file is an empty set
    async fn load(&self) -> Result<HashSet<i64>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice::<Vec<i64>>(&bytes)?.into_iter().collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, subscribers: &HashSet<i64>) -> Result<(), StoreError> {
        let mut ids: Vec<i64> = subscribers.iter().copied().collect();
        ids.sort_unstable();
        let json = serde_json::to_vec(&ids)?;

        // write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
