//! The asset publisher.
//!
//! Performs the two-phase publish of an extracted blob: create the
//! asset, process it across all locales, then publish it. The
//! environment handle is resolved lazily on the first publish and
//! memoized for the publisher's lifetime behind a single-flight cell, so
//! concurrent first publishes await one resolution and at most one live
//! handle exists.
//!
//! A failure at any step rejects the whole operation; no partial record
//! is returned and no server-side rollback is attempted, so an asset
//! created before a failing publish step is orphaned remotely. That is a
//! known, unresolved failure mode of the flow.

use thiserror::Error;
use tokio::sync::OnceCell;

use cropkit_core::ImageBlob;

use crate::cancel::CancelToken;
use crate::record::{AssetFields, AssetRecord};
use crate::store::{AssetEnvironment, AssetStore, StoreError, DEFAULT_ENVIRONMENT};

/// Which space/environment the publisher targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Target space id.
    pub space_id: String,
    /// Target environment id.
    pub environment_id: String,
}

impl PublishConfig {
    /// Target a space with the default environment.
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            environment_id: DEFAULT_ENVIRONMENT.to_string(),
        }
    }

    /// Target a named environment.
    pub fn with_environment(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = environment_id.into();
        self
    }
}

/// Errors rejecting a publish, naming the step that failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to resolve asset store environment")]
    Resolve(#[source] StoreError),

    #[error("Asset creation failed")]
    Create(#[source] StoreError),

    #[error("Asset processing failed")]
    Process(#[source] StoreError),

    #[error("Asset publish failed")]
    Publish(#[source] StoreError),

    #[error("Publish cancelled")]
    Cancelled,
}

/// Publishes extracted blobs to the remote asset store.
///
/// The store client is constructed explicitly and injected; the
/// publisher holds no process-global state.
pub struct AssetPublisher<S: AssetStore> {
    store: S,
    config: PublishConfig,
    environment: OnceCell<S::Environment>,
}

impl<S: AssetStore> AssetPublisher<S> {
    /// Create a publisher over an explicitly constructed store client.
    pub fn new(store: S, config: PublishConfig) -> Self {
        Self {
            store,
            config,
            environment: OnceCell::new(),
        }
    }

    /// Whether an environment handle has been resolved yet.
    pub fn has_environment(&self) -> bool {
        self.environment.initialized()
    }

    /// Resolve (or return the memoized) environment handle.
    ///
    /// `OnceCell` serializes concurrent initializers, so simultaneous
    /// first publishes share one resolution.
    async fn environment(&self) -> Result<&S::Environment, PublishError> {
        self.environment
            .get_or_try_init(|| async {
                tracing::debug!(
                    space = %self.config.space_id,
                    environment = %self.config.environment_id,
                    "resolving asset store environment"
                );
                self.store
                    .resolve_environment(&self.config.space_id, &self.config.environment_id)
                    .await
            })
            .await
            .map_err(PublishError::Resolve)
    }

    /// Publish an extracted blob under the given file name.
    ///
    /// Steps: resolve environment, create the asset (title and
    /// description derived from the file name), process it for all
    /// locales, publish it. The returned record has status `Published`.
    ///
    /// # Errors
    ///
    /// Rejects with the failing step; the caller must treat any error as
    /// "nothing was published" even though earlier steps may have
    /// completed server-side.
    pub async fn publish(
        &self,
        blob: &ImageBlob,
        file_name: &str,
    ) -> Result<AssetRecord, PublishError> {
        let environment = self.environment().await?;

        let fields = AssetFields::from_blob(blob, file_name);
        let draft = environment
            .create_asset(fields)
            .await
            .map_err(PublishError::Create)?;
        tracing::debug!(asset = %draft.id, "asset created");

        let processed = environment
            .process_for_all_locales(&draft.id)
            .await
            .map_err(PublishError::Process)?;

        let published = environment
            .publish(&processed.id)
            .await
            .map_err(PublishError::Publish)?;

        tracing::info!(
            asset = %published.id,
            file_name = %published.file_name,
            bytes = published.byte_len,
            "asset published"
        );
        Ok(published)
    }

    /// Publish with cancellation.
    ///
    /// Rejects with [`PublishError::Cancelled`] when the token fires
    /// before the publish completes. An operation already dispatched to
    /// the store is not recalled; its eventual result is dropped.
    pub async fn publish_with_cancel(
        &self,
        blob: &ImageBlob,
        file_name: &str,
        cancel: &CancelToken,
    ) -> Result<AssetRecord, PublishError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(file_name, "publish cancelled");
                Err(PublishError::Cancelled)
            }
            result = self.publish(blob, file_name) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use crate::memory::{InMemoryStore, MemoryEnvironment};
    use crate::record::AssetStatus;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn blob() -> ImageBlob {
        ImageBlob {
            bytes: vec![0xFF, 0xD8, 0x00, 0x11, 0x22, 0xFF, 0xD9],
            content_type: "image/jpeg".to_string(),
        }
    }

    fn publisher() -> (InMemoryStore, AssetPublisher<InMemoryStore>) {
        let store = InMemoryStore::new("space", "develop");
        let publisher = AssetPublisher::new(store.clone(), PublishConfig::new("space"));
        (store, publisher)
    }

    #[tokio::test]
    async fn test_publish_happy_path() {
        let (_store, publisher) = publisher();
        let record = publisher
            .publish(&blob(), "cropped_image_2024-01-01T00:00:00Z.jpg")
            .await
            .unwrap();

        assert_eq!(record.status, AssetStatus::Published);
        assert_eq!(
            record.title,
            "Asset_cropped_image_2024-01-01T00:00:00Z.jpg"
        );
        assert_eq!(
            record.description,
            "Asset_cropped_image_2024-01-01T00:00:00Z.jpg Description"
        );
        assert_eq!(record.byte_len, 7);
    }

    #[tokio::test]
    async fn test_environment_resolved_lazily_and_memoized() {
        let (store, publisher) = publisher();
        assert!(!publisher.has_environment());
        assert_eq!(store.resolution_count(), 0);

        publisher.publish(&blob(), "a.jpg").await.unwrap();
        publisher.publish(&blob(), "b.jpg").await.unwrap();

        assert!(publisher.has_environment());
        assert_eq!(store.resolution_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_publishes_share_one_handle() {
        let (store, publisher) = publisher();
        let publisher = Arc::new(publisher);

        let a = {
            let p = Arc::clone(&publisher);
            tokio::spawn(async move { p.publish(&blob(), "a.jpg").await })
        };
        let b = {
            let p = Arc::clone(&publisher);
            tokio::spawn(async move { p.publish(&blob(), "b.jpg").await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(store.resolution_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_space_rejects_at_resolve() {
        let store = InMemoryStore::new("space", "develop");
        let publisher = AssetPublisher::new(store.clone(), PublishConfig::new("wrong-space"));

        let result = publisher.publish(&blob(), "a.jpg").await;
        assert!(matches!(result, Err(PublishError::Resolve(_))));
        assert_eq!(store.asset_count().await, 0);
    }

    // ------------------------------------------------------------------
    // A store whose environment fails at the processing step.
    // ------------------------------------------------------------------

    #[derive(Clone)]
    struct FailAtProcessStore {
        inner: InMemoryStore,
    }

    struct FailAtProcessEnvironment {
        inner: MemoryEnvironment,
    }

    #[async_trait]
    impl AssetStore for FailAtProcessStore {
        type Environment = FailAtProcessEnvironment;

        async fn resolve_environment(
            &self,
            space_id: &str,
            environment_id: &str,
        ) -> Result<FailAtProcessEnvironment, StoreError> {
            let inner = self.inner.resolve_environment(space_id, environment_id).await?;
            Ok(FailAtProcessEnvironment { inner })
        }
    }

    #[async_trait]
    impl AssetEnvironment for FailAtProcessEnvironment {
        async fn create_asset(&self, fields: AssetFields) -> Result<AssetRecord, StoreError> {
            self.inner.create_asset(fields).await
        }

        async fn process_for_all_locales(&self, _id: &str) -> Result<AssetRecord, StoreError> {
            Err(StoreError::Rejected("processing backend down".to_string()))
        }

        async fn publish(&self, asset_id: &str) -> Result<AssetRecord, StoreError> {
            self.inner.publish(asset_id).await
        }
    }

    #[tokio::test]
    async fn test_failure_at_process_step_rejects_whole_publish() {
        let store = FailAtProcessStore {
            inner: InMemoryStore::new("space", "develop"),
        };
        let publisher = AssetPublisher::new(store.clone(), PublishConfig::new("space"));

        let result = publisher.publish(&blob(), "a.jpg").await;
        assert!(matches!(result, Err(PublishError::Process(_))));

        // The draft was created server-side before the failure: the
        // orphaned record is the documented unresolved failure mode.
        assert_eq!(store.inner.asset_count().await, 1);
    }

    // ------------------------------------------------------------------
    // A store whose environment blocks forever at the processing step.
    // ------------------------------------------------------------------

    #[derive(Clone)]
    struct StallAtProcessStore {
        inner: InMemoryStore,
        gate: Arc<Notify>,
    }

    struct StallAtProcessEnvironment {
        inner: MemoryEnvironment,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AssetStore for StallAtProcessStore {
        type Environment = StallAtProcessEnvironment;

        async fn resolve_environment(
            &self,
            space_id: &str,
            environment_id: &str,
        ) -> Result<StallAtProcessEnvironment, StoreError> {
            let inner = self.inner.resolve_environment(space_id, environment_id).await?;
            Ok(StallAtProcessEnvironment {
                inner,
                gate: Arc::clone(&self.gate),
            })
        }
    }

    #[async_trait]
    impl AssetEnvironment for StallAtProcessEnvironment {
        async fn create_asset(&self, fields: AssetFields) -> Result<AssetRecord, StoreError> {
            self.inner.create_asset(fields).await
        }

        async fn process_for_all_locales(&self, asset_id: &str) -> Result<AssetRecord, StoreError> {
            self.gate.notified().await;
            self.inner.process_for_all_locales(asset_id).await
        }

        async fn publish(&self, asset_id: &str) -> Result<AssetRecord, StoreError> {
            self.inner.publish(asset_id).await
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_rejects_immediately() {
        let (_store, publisher) = publisher();
        let (handle, token) = cancel_pair();
        handle.cancel();

        let result = publisher
            .publish_with_cancel(&blob(), "a.jpg", &token)
            .await;
        assert!(matches!(result, Err(PublishError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_mid_flight() {
        let store = StallAtProcessStore {
            inner: InMemoryStore::new("space", "develop"),
            gate: Arc::new(Notify::new()),
        };
        let publisher = Arc::new(AssetPublisher::new(store, PublishConfig::new("space")));
        let (handle, token) = cancel_pair();

        let task = {
            let publisher = Arc::clone(&publisher);
            tokio::spawn(async move {
                publisher
                    .publish_with_cancel(&blob(), "a.jpg", &token)
                    .await
            })
        };

        // Let the publish reach the stalled processing step, then cancel.
        tokio::task::yield_now().await;
        handle.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(PublishError::Cancelled)));
    }

    #[tokio::test]
    async fn test_uncancelled_token_does_not_interfere() {
        let (_store, publisher) = publisher();
        let (_handle, token) = cancel_pair();

        let record = publisher
            .publish_with_cancel(&blob(), "a.jpg", &token)
            .await
            .unwrap();
        assert_eq!(record.status, AssetStatus::Published);
    }
}
