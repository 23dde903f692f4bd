//! In-process asset store.
//!
//! A working [`AssetStore`] implementation holding assets in memory. It
//! backs the test suite and headless demos; a real storage backend sits
//! behind the same seam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::record::{AssetFields, AssetRecord, AssetStatus};
use crate::store::{AssetEnvironment, AssetStore, StoreError};

#[derive(Default)]
struct Shared {
    assets: Mutex<HashMap<String, AssetRecord>>,
    next_id: AtomicU64,
    resolutions: AtomicUsize,
}

/// In-memory asset store with a single space/environment pair.
#[derive(Clone)]
pub struct InMemoryStore {
    space_id: String,
    environment_id: String,
    shared: Arc<Shared>,
}

impl InMemoryStore {
    /// Create a store that accepts the given space and environment ids.
    pub fn new(space_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            environment_id: environment_id.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// How many environment resolutions the store has served.
    ///
    /// Lets tests assert the single-flight behavior of lazy resolution.
    pub fn resolution_count(&self) -> usize {
        self.shared.resolutions.load(Ordering::SeqCst)
    }

    /// Number of assets currently held.
    pub async fn asset_count(&self) -> usize {
        self.shared.assets.lock().await.len()
    }
}

#[async_trait]
impl AssetStore for InMemoryStore {
    type Environment = MemoryEnvironment;

    async fn resolve_environment(
        &self,
        space_id: &str,
        environment_id: &str,
    ) -> Result<MemoryEnvironment, StoreError> {
        if space_id != self.space_id {
            return Err(StoreError::SpaceNotFound(space_id.to_string()));
        }
        if environment_id != self.environment_id {
            return Err(StoreError::EnvironmentNotFound(environment_id.to_string()));
        }
        self.shared.resolutions.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryEnvironment {
            shared: Arc::clone(&self.shared),
        })
    }
}

/// Environment handle into an [`InMemoryStore`].
#[derive(Clone)]
pub struct MemoryEnvironment {
    shared: Arc<Shared>,
}

#[async_trait]
impl AssetEnvironment for MemoryEnvironment {
    async fn create_asset(&self, fields: AssetFields) -> Result<AssetRecord, StoreError> {
        let n = self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = AssetRecord {
            id: format!("asset-{n}"),
            title: fields.title,
            description: fields.description,
            content_type: fields.file.content_type,
            file_name: fields.file.file_name,
            byte_len: fields.file.binary.len() as u64,
            status: AssetStatus::Draft,
        };
        self.shared
            .assets
            .lock()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn process_for_all_locales(&self, asset_id: &str) -> Result<AssetRecord, StoreError> {
        let mut assets = self.shared.assets.lock().await;
        let record = assets
            .get_mut(asset_id)
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.to_string()))?;
        record.status = AssetStatus::Processing;
        Ok(record.clone())
    }

    async fn publish(&self, asset_id: &str) -> Result<AssetRecord, StoreError> {
        let mut assets = self.shared.assets.lock().await;
        let record = assets
            .get_mut(asset_id)
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.to_string()))?;
        if record.status != AssetStatus::Processing {
            return Err(StoreError::Rejected(format!(
                "asset {asset_id} has not been processed"
            )));
        }
        record.status = AssetStatus::Published;
        Ok(record.clone())
    }
}
