//! Canvas extraction: crop rectangle to encoded image blob.
//!
//! Extraction renders the bound instance's current crop rectangle under
//! fixed output constraints and encodes it as JPEG at maximum quality.
//! An instance that is absent or not ready yields `Ok(None)` - a
//! caller-visible "nothing to extract" result, never an error.

use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::instance::{CanvasOptions, EditingInstance};
use crate::source::Canvas;

/// Errors that can occur while encoding an extracted canvas.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The rendered canvas has zero width or height.
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Fixed output constraints for extraction.
///
/// Defaults: 4096x4096 dimension caps, white fill, high-quality
/// smoothing, JPEG at maximum quality factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConstraints {
    /// Canvas rendering options (caps, fill, smoothing).
    pub canvas: CanvasOptions,
    /// JPEG quality factor (1-100).
    pub quality: u8,
}

impl Default for ExtractConstraints {
    fn default() -> Self {
        Self {
            canvas: CanvasOptions::default(),
            quality: 100,
        }
    }
}

/// An encoded image produced by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME content type of the encoding.
    pub content_type: String,
}

impl ImageBlob {
    /// Byte length of the encoded image.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob holds no data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Persist the blob locally (the user-driven save action).
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Render and encode the instance's current crop rectangle.
///
/// # Returns
///
/// `Ok(None)` when the instance is not ready (nothing to extract),
/// otherwise the encoded blob. Deterministic for a fixed crop rectangle
/// and instance state.
///
/// # Errors
///
/// Returns [`ExtractError`] only for encoding failures on a rendered
/// canvas; the "no instance" case is not an error.
pub fn extract<I: EditingInstance>(
    instance: &I,
    constraints: &ExtractConstraints,
) -> Result<Option<ImageBlob>, ExtractError> {
    let canvas = match instance.cropped_canvas(&constraints.canvas) {
        Some(canvas) => canvas,
        None => return Ok(None),
    };

    encode_jpeg(&canvas, constraints.quality).map(Some)
}

/// Encode an RGB canvas as JPEG.
///
/// Quality is clamped to 1-100.
pub fn encode_jpeg(canvas: &Canvas, quality: u8) -> Result<ImageBlob, ExtractError> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ExtractError::InvalidDimensions {
            width: canvas.width,
            height: canvas.height,
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));

    encoder
        .write_image(
            &canvas.pixels,
            canvas.width,
            canvas.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ExtractError::EncodingFailed(e.to_string()))?;

    Ok(ImageBlob {
        bytes: buffer.into_inner(),
        content_type: "image/jpeg".to_string(),
    })
}

/// Suggested file name for a locally saved extraction.
///
/// Pattern: `cropped_image_<ISO-8601 timestamp>.<ext>`.
pub fn artifact_file_name(timestamp: DateTime<Utc>, ext: &str) -> String {
    format!(
        "cropped_image_{}.{}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        ext
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-empty canvas encodes to a valid JPEG at any quality.
        #[test]
        fn prop_encode_valid_jpeg(
            w in 1u32..=40,
            h in 1u32..=40,
            quality in 1u8..=100,
            shade in 0u8..=255,
        ) {
            let canvas = Canvas::filled(w, h, [shade, shade, shade]);
            let blob = encode_jpeg(&canvas, quality).unwrap();
            prop_assert_eq!(&blob.bytes[0..2], &[0xFF, 0xD8]);
            let len = blob.len();
            prop_assert_eq!(&blob.bytes[len - 2..], &[0xFF, 0xD9]);
        }

        /// Encoding is deterministic.
        #[test]
        fn prop_encode_deterministic(
            w in 1u32..=24,
            h in 1u32..=24,
            quality in 1u8..=100,
        ) {
            let canvas = Canvas::filled(w, h, [90, 120, 150]);
            let a = encode_jpeg(&canvas, quality).unwrap();
            let b = encode_jpeg(&canvas, quality).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
