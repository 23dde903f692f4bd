//! End-to-end crop-and-publish pipeline.
//!
//! Couples a [`CropSessionController`] to an [`AssetPublisher`] (or an
//! [`UploadGateway`]): the session produces the blob and tracks the
//! publish transitions, the publisher carries the blob out. Closing the
//! pipeline cancels whatever is in flight before tearing the session
//! down.

use chrono::Utc;
use thiserror::Error;

use cropkit_core::{artifact_file_name, CropSessionController, ImageBlob, InstanceFactory};

use crate::cancel::{cancel_pair, CancelHandle, CancelToken};
use crate::gateway::{GatewayError, GatewayResponse, MultipartFile, UploadGateway};
use crate::publisher::{AssetPublisher, PublishError};
use crate::record::AssetRecord;
use crate::store::AssetStore;

/// Errors surfaced by pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No extracted blob is available to publish or upload.
    #[error("No extracted image to publish")]
    NothingExtracted,

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Session plus publisher, wired with a cancellation handle.
pub struct CropPublishPipeline<F: InstanceFactory, S: AssetStore> {
    session: CropSessionController<F>,
    publisher: AssetPublisher<S>,
    cancel: CancelHandle,
}

impl<F: InstanceFactory, S: AssetStore> CropPublishPipeline<F, S> {
    /// Wire a session controller to a publisher.
    pub fn new(session: CropSessionController<F>, publisher: AssetPublisher<S>) -> Self {
        let (cancel, _) = cancel_pair();
        Self {
            session,
            publisher,
            cancel,
        }
    }

    /// The session controller, for editing operations.
    pub fn session(&mut self) -> &mut CropSessionController<F> {
        &mut self.session
    }

    /// Read-only view of the session controller.
    pub fn session_ref(&self) -> &CropSessionController<F> {
        &self.session
    }

    /// A token observing this pipeline's cancellation handle.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.token()
    }

    /// Publish the extracted blob to the asset store.
    ///
    /// Drives the session's publish transitions: `Publishing` while in
    /// flight, then `Published` on success or `Failed` on rejection (the
    /// blob is retained for retry).
    ///
    /// # Errors
    ///
    /// [`PipelineError::NothingExtracted`] when the session holds no
    /// blob, otherwise the publisher's error with the session left in
    /// `Failed`.
    pub async fn publish_extracted(&mut self) -> Result<AssetRecord, PipelineError> {
        let (blob, file_name) = self.take_payload()?;
        if !self.session.begin_publish() {
            return Err(PipelineError::NothingExtracted);
        }

        let token = self.cancel.token();
        match self
            .publisher
            .publish_with_cancel(&blob, &file_name, &token)
            .await
        {
            Ok(record) => {
                self.session.complete_publish();
                Ok(record)
            }
            Err(err) => {
                self.session.fail_publish();
                Err(err.into())
            }
        }
    }

    /// Upload the extracted blob through a direct gateway.
    ///
    /// Same session transitions as [`publish_extracted`], but the blob
    /// travels as a single multipart submission.
    ///
    /// [`publish_extracted`]: Self::publish_extracted
    pub async fn upload_extracted<G: UploadGateway>(
        &mut self,
        gateway: &G,
    ) -> Result<GatewayResponse, PipelineError> {
        let (blob, file_name) = self.take_payload()?;
        if !self.session.begin_publish() {
            return Err(PipelineError::NothingExtracted);
        }

        let token = self.cancel.token();
        let part = MultipartFile::from_blob(&blob, &file_name);
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::warn!(file_name = %file_name, "upload cancelled");
                Err(GatewayError::Transport("cancelled".to_string()))
            }
            result = gateway.upload(part) => result,
        };

        match result {
            Ok(response) => {
                self.session.complete_publish();
                Ok(response)
            }
            Err(err) => {
                self.session.fail_publish();
                Err(err.into())
            }
        }
    }

    /// Cancel anything in flight and close the session.
    ///
    /// The handle is re-armed afterwards so a subsequent session on the
    /// same pipeline is not born cancelled.
    pub fn close(&mut self) {
        self.cancel.cancel();
        let (fresh, _) = cancel_pair();
        self.cancel = fresh;
        self.session.close_session();
    }

    fn take_payload(&self) -> Result<(ImageBlob, String), PipelineError> {
        let blob = self
            .session
            .blob()
            .cloned()
            .ok_or(PipelineError::NothingExtracted)?;
        let file_name = artifact_file_name(Utc::now(), "jpg");
        Ok((blob, file_name))
    }
}
