//! Direct upload gateway.
//!
//! An alternative destination for extracted blobs: a single-endpoint
//! upload accepting a multipart form with one `file` part, instead of
//! the full asset store lifecycle. Errors are surfaced to the caller
//! rather than swallowed.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use cropkit_core::ImageBlob;

/// Errors surfaced by an upload attempt.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("Upload transport failure: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("Upload rejected with status {status}")]
    Rejected { status: u16 },
}

/// One file part of a multipart form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name. Always `file` for this gateway.
    pub field_name: String,
    /// File name reported in the part headers.
    pub file_name: String,
    /// MIME content type of the part.
    pub content_type: String,
    /// Part body.
    pub bytes: Vec<u8>,
}

impl MultipartFile {
    /// Wrap an extracted blob as the gateway's `file` field.
    pub fn from_blob(blob: &ImageBlob, file_name: &str) -> Self {
        Self {
            field_name: "file".to_string(),
            file_name: file_name.to_string(),
            content_type: blob.content_type.clone(),
            bytes: blob.bytes.clone(),
        }
    }
}

/// What the gateway answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Parsed response body.
    pub body: Value,
}

impl GatewayResponse {
    /// Whether the status signals success (2xx).
    pub fn is_accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Upload endpoint seam.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Submit one file. Implementations must reject with
    /// [`GatewayError::Rejected`] on a non-success status instead of
    /// returning the response.
    async fn upload(&self, file: MultipartFile) -> Result<GatewayResponse, GatewayError>;
}

/// Gateway that accepts every upload without storing anything.
///
/// Stands in for an unfinished backend endpoint; answers
/// `200 {"success": true}` unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubGateway;

#[async_trait]
impl UploadGateway for StubGateway {
    async fn upload(&self, file: MultipartFile) -> Result<GatewayResponse, GatewayError> {
        tracing::debug!(
            file_name = %file.file_name,
            bytes = file.bytes.len(),
            "stub gateway accepting upload"
        );
        Ok(GatewayResponse {
            status: 200,
            body: json!({ "success": true }),
        })
    }
}
