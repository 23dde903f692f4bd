//! Asset data model for the remote store.
//!
//! Titles and descriptions are derived deterministically from the
//! uploaded file name: `Asset_<name>` / `Asset_<name> Description`.

use cropkit_core::ImageBlob;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Created but not yet processed.
    Draft,
    /// Processed across all configured locales.
    Processing,
    /// Published and publicly addressable.
    Published,
    /// The store rejected the asset.
    Failed,
}

/// Binary payload of an asset submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFile {
    /// MIME content type of the payload.
    pub content_type: String,
    /// File name the asset is stored under.
    pub file_name: String,
    /// Encoded image bytes.
    pub binary: Vec<u8>,
}

/// Fields submitted when creating an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFields {
    pub title: String,
    pub description: String,
    pub file: AssetFile,
}

impl AssetFields {
    /// Build submission fields for an extracted blob.
    pub fn from_blob(blob: &ImageBlob, file_name: &str) -> Self {
        Self {
            title: format!("Asset_{file_name}"),
            description: format!("Asset_{file_name} Description"),
            file: AssetFile {
                content_type: blob.content_type.clone(),
                file_name: file_name.to_string(),
                binary: blob.bytes.clone(),
            },
        }
    }
}

/// The result of a publish. Immutable once returned; callers never
/// mutate a record they receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Store-assigned asset identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// MIME content type of the stored file.
    pub content_type: String,
    /// File name the asset is stored under.
    pub file_name: String,
    /// Byte length of the stored file.
    pub byte_len: u64,
    /// Current lifecycle status.
    pub status: AssetStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> ImageBlob {
        ImageBlob {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            content_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_fields_derived_from_file_name() {
        let fields = AssetFields::from_blob(&blob(), "cropped_image_2024-01-01T00:00:00Z.jpg");
        assert_eq!(
            fields.title,
            "Asset_cropped_image_2024-01-01T00:00:00Z.jpg"
        );
        assert_eq!(
            fields.description,
            "Asset_cropped_image_2024-01-01T00:00:00Z.jpg Description"
        );
        assert_eq!(fields.file.content_type, "image/jpeg");
        assert_eq!(fields.file.binary, blob().bytes);
    }

    #[test]
    fn test_fields_are_deterministic() {
        let a = AssetFields::from_blob(&blob(), "x.jpg");
        let b = AssetFields::from_blob(&blob(), "x.jpg");
        assert_eq!(a, b);
    }
}
