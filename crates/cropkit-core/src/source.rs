//! File intake and source-image handling.
//!
//! A crop session starts from a single user-selected file. The file is
//! held in memory as a previewable source: the raw bytes plus a
//! `data:` URL rendition, matching how a browser file reader hands the
//! image to the crop widget. The MIME filter is `image/*`; no size limit
//! is enforced here (the surrounding UI's 5MB note is advisory only).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// Error types for source-file handling and decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file's content type is not an image type.
    #[error("Not an image: {0}")]
    NotAnImage(String),

    /// The image bytes are corrupted or not in a supported format.
    #[error("Corrupted or unsupported image data: {0}")]
    CorruptedFile(String),

    /// A data URL was malformed (missing scheme, media type or payload).
    #[error("Malformed data URL: {0}")]
    BadDataUrl(String),
}

/// A user-selected source file held in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Original file name (e.g. "photo.jpg").
    pub file_name: String,
    /// MIME content type (e.g. "image/jpeg").
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from raw bytes.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Whether the content type passes the `image/*` intake filter.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Render the file as a `data:` URL for preview display.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            BASE64.encode(&self.bytes)
        )
    }

    /// Parse a `data:` URL back into a source file.
    ///
    /// The file name is not part of a data URL, so the caller supplies it.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::BadDataUrl`] when the URL is missing the
    /// `data:` scheme, the `;base64,` separator, or has an invalid payload.
    pub fn from_data_url(url: &str, file_name: impl Into<String>) -> Result<Self, DecodeError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| DecodeError::BadDataUrl("missing data: scheme".to_string()))?;

        let (content_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| DecodeError::BadDataUrl("missing base64 payload".to_string()))?;

        let bytes = BASE64
            .decode(payload)
            .map_err(|e| DecodeError::BadDataUrl(e.to_string()))?;

        Ok(Self {
            file_name: file_name.into(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// Decode the file into an RGB [`Canvas`].
    ///
    /// EXIF orientation is deliberately not applied; the crop widget is
    /// driven with orientation checking disabled and operates on the pixel
    /// data as stored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotAnImage`] when the content type fails the
    /// `image/*` filter, or [`DecodeError::CorruptedFile`] when the bytes
    /// cannot be decoded.
    pub fn decode(&self) -> Result<Canvas, DecodeError> {
        if !self.is_image() {
            return Err(DecodeError::NotAnImage(self.content_type.clone()));
        }

        let reader = image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

        let img = reader
            .decode()
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

        Ok(Canvas::from_rgb_image(img.into_rgb8()))
    }
}

/// An in-memory pixel surface with RGB data.
///
/// This is the shared pixel type for crop, rotation, resize and
/// extraction. Pixel data is row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB pixel data, length = width * height * 3.
    pub pixels: Vec<u8>,
}

impl Canvas {
    /// Create a canvas from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a canvas filled with a solid color.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a canvas from an `image::RgbImage`.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbImage` for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Check if this is an empty/invalid canvas.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture() -> Vec<u8> {
        // Encode a tiny PNG in-process so the fixture stays valid.
        let img = image::RgbImage::from_fn(4, 2, |x, _| image::Rgb([(x * 60) as u8, 10, 200]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn test_mime_filter() {
        let img = SourceFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert!(img.is_image());

        let txt = SourceFile::new("a.txt", "text/plain", vec![1, 2, 3]);
        assert!(!txt.is_image());
    }

    #[test]
    fn test_data_url_round_trip() {
        let file = SourceFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xD9]);
        let url = file.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let parsed = SourceFile::from_data_url(&url, "photo.jpg").unwrap();
        assert_eq!(parsed.content_type, "image/jpeg");
        assert_eq!(parsed.bytes, file.bytes);
        assert_eq!(parsed.file_name, "photo.jpg");
    }

    #[test]
    fn test_data_url_missing_scheme() {
        let result = SourceFile::from_data_url("image/png;base64,AAAA", "x");
        assert!(matches!(result, Err(DecodeError::BadDataUrl(_))));
    }

    #[test]
    fn test_data_url_missing_payload() {
        let result = SourceFile::from_data_url("data:image/png", "x");
        assert!(matches!(result, Err(DecodeError::BadDataUrl(_))));
    }

    #[test]
    fn test_data_url_invalid_base64() {
        let result = SourceFile::from_data_url("data:image/png;base64,!!!not-base64!!!", "x");
        assert!(matches!(result, Err(DecodeError::BadDataUrl(_))));
    }

    #[test]
    fn test_decode_png() {
        let file = SourceFile::new("tiny.png", "image/png", png_fixture());
        let canvas = file.decode().unwrap();
        assert_eq!(canvas.width, 4);
        assert_eq!(canvas.height, 2);
        assert_eq!(canvas.pixels.len(), 4 * 2 * 3);
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let file = SourceFile::new("a.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(file.decode(), Err(DecodeError::NotAnImage(_))));
    }

    #[test]
    fn test_decode_rejects_corrupt_bytes() {
        let file = SourceFile::new("bad.png", "image/png", vec![0x00, 0x01, 0x02]);
        assert!(matches!(file.decode(), Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_canvas_filled() {
        let canvas = Canvas::filled(3, 2, [255, 128, 0]);
        assert_eq!(canvas.pixel_count(), 6);
        assert_eq!(&canvas.pixels[0..3], &[255, 128, 0]);
        assert_eq!(&canvas.pixels[15..18], &[255, 128, 0]);
    }

    #[test]
    fn test_canvas_rgb_round_trip() {
        let canvas = Canvas::filled(5, 4, [9, 8, 7]);
        let img = canvas.to_rgb_image().unwrap();
        let back = Canvas::from_rgb_image(img);
        assert_eq!(back, canvas);
    }

    #[test]
    fn test_canvas_empty() {
        let canvas = Canvas::new(0, 0, vec![]);
        assert!(canvas.is_empty());
    }
}
