//! The editing-instance seam.
//!
//! The interactive crop widget is an external collaborator: the session
//! controller only talks to it through [`EditingInstance`], a small
//! capability surface for ratio/zoom/rotate/extract. The widget's pixel
//! manipulation, drag handles and rendering are out of scope here.
//!
//! [`SoftwareCropper`] is the in-process implementation used by tests and
//! headless extraction.

mod software;

pub use software::{SoftwareCropper, SoftwareCropperFactory};

use serde::{Deserialize, Serialize};

use crate::source::Canvas;
use crate::transform::Smoothing;

/// The crop rectangle in pixel coordinates, as the widget reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Rectangle width.
    pub width: f64,
    /// Rectangle height.
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Construction configuration for an editing instance.
///
/// Every field the widget is driven with, enumerated explicitly; nothing
/// open-ended is forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropperConfig {
    /// View mode: 0 = crop box may extend past the canvas, 1 = crop box
    /// restricted to the canvas. The session runs with 1.
    pub view_mode: u8,
    /// Minimum crop box width in pixels.
    pub min_crop_box_width: u32,
    /// Minimum crop box height in pixels.
    pub min_crop_box_height: u32,
    /// Whether the widget paints its checkered backdrop behind the image.
    pub background: bool,
    /// Fraction of the canvas the initial automatic crop box covers
    /// (0.0 to 1.0).
    pub auto_crop_area: f64,
    /// Whether guide lines are drawn inside the crop box.
    pub guides: bool,
    /// Minimum container width in pixels.
    pub min_container_width: u32,
    /// Minimum container height in pixels.
    pub min_container_height: u32,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            view_mode: 1,
            min_crop_box_width: 10,
            min_crop_box_height: 10,
            background: false,
            auto_crop_area: 1.0,
            guides: true,
            min_container_width: 200,
            min_container_height: 100,
        }
    }
}

/// Rendering options for [`EditingInstance::cropped_canvas`].
///
/// These are the fixed extraction constraints: output dimension caps, a
/// fill color for regions with no source coverage, and the smoothing
/// quality applied when the result must be downscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    /// Output width cap in pixels.
    pub max_width: u32,
    /// Output height cap in pixels.
    pub max_height: u32,
    /// RGB fill color for uncovered regions.
    pub fill: [u8; 3],
    /// Smoothing quality for downscaling.
    pub smoothing: Smoothing,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            max_width: 4096,
            max_height: 4096,
            fill: [255, 255, 255],
            smoothing: Smoothing::High,
        }
    }
}

/// A live handle to the crop widget bound to one source image.
///
/// All operations execute synchronously within one turn. Operations on an
/// instance that is not yet ready are the caller's concern: the session
/// controller defers ratio application until readiness is signalled.
pub trait EditingInstance {
    /// Whether the instance has finished initializing.
    fn is_ready(&self) -> bool;

    /// Constrain the crop box to the given width/height ratio.
    /// A ratio of 0.0 removes the constraint.
    fn set_aspect_ratio(&mut self, ratio: f64);

    /// Set the zoom level, `0.0` (none) to `1.0` (maximum).
    fn zoom_to(&mut self, level: f64);

    /// Rotate the backing image by the given angle in degrees.
    fn rotate(&mut self, degrees: f64);

    /// The current crop rectangle.
    fn crop_rect(&self) -> CropRect;

    /// Render the current crop rectangle to a pixel canvas.
    ///
    /// Returns `None` while the instance is not ready or after disposal;
    /// deterministic for a fixed instance state.
    fn cropped_canvas(&self, options: &CanvasOptions) -> Option<Canvas>;

    /// Release the underlying rendering resources.
    ///
    /// Must be called before the handle is dropped; calling twice is
    /// harmless.
    fn dispose(&mut self);
}

/// Binds editing instances to decoded sources.
///
/// The session controller owns a factory so `open_session` can create the
/// widget handle without knowing the concrete widget type.
pub trait InstanceFactory {
    type Instance: EditingInstance;

    /// Create an instance bound to the given source under the given
    /// configuration.
    fn bind(&self, source: &Canvas, config: &CropperConfig) -> Self::Instance;
}
