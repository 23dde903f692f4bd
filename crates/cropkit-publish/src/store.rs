//! The remote asset store seam.
//!
//! The store is reached through two capability traits mirroring its
//! logical API: [`AssetStore`] resolves a space/environment pair into an
//! environment handle, and [`AssetEnvironment`] carries the asset
//! operations (create, process for all locales, publish). Transports are
//! out of scope; implementations decide how the calls travel.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{AssetFields, AssetRecord};

/// Environment id used when the caller does not name one.
pub const DEFAULT_ENVIRONMENT: &str = "develop";

/// Errors surfaced by asset store operations.
///
/// No distinction is made between transient and permanent failures; the
/// caller treats any error as "nothing was published".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested space does not exist or is not accessible.
    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    /// The requested environment does not exist within the space.
    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),

    /// An asset id was not recognized by the store.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The store rejected the operation.
    #[error("Store rejected the operation: {0}")]
    Rejected(String),

    /// The call could not reach the store.
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// A resolved connection to one space/environment of the asset store.
#[async_trait]
pub trait AssetEnvironment: Send + Sync {
    /// Create a draft asset from the given fields.
    async fn create_asset(&self, fields: AssetFields) -> Result<AssetRecord, StoreError>;

    /// Process the asset's file across all configured locales.
    async fn process_for_all_locales(&self, asset_id: &str) -> Result<AssetRecord, StoreError>;

    /// Publish a processed asset.
    async fn publish(&self, asset_id: &str) -> Result<AssetRecord, StoreError>;
}

/// Client for the remote asset store.
///
/// Constructed explicitly at startup and handed to the publisher; there
/// is no process-global client.
#[async_trait]
pub trait AssetStore: Send + Sync {
    type Environment: AssetEnvironment + Send + Sync;

    /// Fetch the target space and resolve the named environment in it.
    async fn resolve_environment(
        &self,
        space_id: &str,
        environment_id: &str,
    ) -> Result<Self::Environment, StoreError>;
}
