//! Crop modes and the aspect-ratio policy.
//!
//! Each [`CropMode`] maps to a fixed numeric aspect ratio that the
//! controller feeds into the bound editing instance. The mapping is a
//! total, pure function: every mode has a ratio and the table never
//! changes at runtime.

use serde::{Deserialize, Serialize};

/// Aspect ratio value meaning "no constraint" (free-form crop box).
pub const FREE_FORM: f64 = 0.0;

/// The closed set of crop modes offered by the mode selector.
///
/// Wire names match the mode-selector identifiers so serialized
/// configuration stays compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropMode {
    /// Unconstrained crop box.
    #[default]
    #[serde(rename = "freeRatio")]
    FreeRatio,
    /// Classic 4:3 photo ratio.
    #[serde(rename = "4/3")]
    FourThree,
    /// Widescreen 16:9 ratio.
    #[serde(rename = "16/9")]
    SixteenNine,
    /// Square ratio used for round avatars.
    #[serde(rename = "avatar")]
    Avatar,
}

impl CropMode {
    /// Map this mode to its aspect ratio (width / height).
    ///
    /// Returns [`FREE_FORM`] (0.0) for [`CropMode::FreeRatio`], meaning the
    /// crop box is unconstrained. The caller applies the value to the bound
    /// editing instance; with no instance bound the value is discarded, not
    /// queued (the controller re-applies the current mode once an instance
    /// becomes ready).
    pub fn aspect_ratio(self) -> f64 {
        match self {
            CropMode::FreeRatio => FREE_FORM,
            CropMode::FourThree => 1.33,
            CropMode::SixteenNine => 1.78,
            CropMode::Avatar => 1.0,
        }
    }

    /// All modes, in mode-selector order.
    pub fn all() -> [CropMode; 4] {
        [
            CropMode::FreeRatio,
            CropMode::FourThree,
            CropMode::SixteenNine,
            CropMode::Avatar,
        ]
    }
}
