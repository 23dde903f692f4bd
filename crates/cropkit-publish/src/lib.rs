//! Cropkit Publish - Async publish pipeline
//!
//! The async counterpart to `cropkit-core`: carries extracted image
//! blobs out of the process, either through the remote asset store
//! (create, process for all locales, publish) or through a direct
//! multipart upload gateway. Cancellation tokens let the session owner
//! abandon in-flight network work when the session closes.

pub mod cancel;
pub mod gateway;
pub mod memory;
pub mod pipeline;
pub mod publisher;
pub mod record;
pub mod store;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use gateway::{GatewayError, GatewayResponse, MultipartFile, StubGateway, UploadGateway};
pub use memory::{InMemoryStore, MemoryEnvironment};
pub use pipeline::{CropPublishPipeline, PipelineError};
pub use publisher::{AssetPublisher, PublishConfig, PublishError};
pub use record::{AssetFields, AssetFile, AssetRecord, AssetStatus};
pub use store::{AssetEnvironment, AssetStore, StoreError, DEFAULT_ENVIRONMENT};
