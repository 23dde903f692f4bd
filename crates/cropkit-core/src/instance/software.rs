//! In-process editing instance.
//!
//! `SoftwareCropper` implements the widget capability entirely on the
//! CPU so crop sessions can run headless (tests, batch extraction). The
//! behavior is a deterministic rendition of the interactive widget:
//! zoom narrows the crop box about its center, rotation re-fits the box
//! to the rotated bounds, and rendering applies rotate -> crop ->
//! shrink-to-fit.

use crate::instance::{
    CanvasOptions, CropRect, CropperConfig, EditingInstance, InstanceFactory,
};
use crate::source::Canvas;
use crate::transform::{crop, rotate, rotated_bounds, shrink_to_fit};

/// CPU-backed editing instance.
#[derive(Debug, Clone)]
pub struct SoftwareCropper {
    source: Canvas,
    config: CropperConfig,
    crop_rect: CropRect,
    aspect_ratio: f64,
    rotation: f64,
    zoom: f64,
    ready: bool,
    disposed: bool,
}

impl SoftwareCropper {
    /// Bind a cropper to a decoded source.
    ///
    /// The initial crop box covers `auto_crop_area` of the canvas,
    /// centered. The instance reports ready immediately; there is no
    /// asynchronous widget initialization to wait for.
    pub fn bind(source: Canvas, config: CropperConfig) -> Self {
        let crop_rect = auto_crop_rect(
            source.width,
            source.height,
            config.auto_crop_area,
            0.0,
            &config,
        );
        Self {
            source,
            config,
            crop_rect,
            aspect_ratio: 0.0,
            rotation: 0.0,
            zoom: 0.0,
            ready: true,
            disposed: false,
        }
    }

    /// Dimensions of the current (rotated) drawing surface.
    fn surface_bounds(&self) -> (u32, u32) {
        rotated_bounds(self.source.width, self.source.height, self.rotation)
    }

    /// Position the crop box explicitly, clamped to the surface and the
    /// configured minimum crop box size.
    pub fn set_crop_rect(&mut self, rect: CropRect) {
        let (w, h) = self.surface_bounds();
        self.crop_rect = clamp_rect(rect, w, h, &self.config);
    }

    /// Re-fit the crop box after a ratio, zoom or rotation change.
    fn refit_crop_box(&mut self) {
        let (w, h) = self.surface_bounds();
        let area = self.config.auto_crop_area * zoom_scale(self.zoom);
        self.crop_rect = auto_crop_rect(w, h, area, self.aspect_ratio, &self.config);
    }
}

/// Crop box coverage factor for a zoom level in [0, 1].
///
/// Zooming in narrows the visible region, so the box shrinks toward its
/// center: level 0 keeps full coverage, level 1 halves it.
fn zoom_scale(level: f64) -> f64 {
    1.0 / (1.0 + level)
}

/// Compute a centered crop box covering `area` of a `width` x `height`
/// surface, optionally constrained to an aspect ratio.
fn auto_crop_rect(
    width: u32,
    height: u32,
    area: f64,
    ratio: f64,
    config: &CropperConfig,
) -> CropRect {
    let surface_w = width as f64;
    let surface_h = height as f64;
    let scale = area.clamp(0.0, 1.0).sqrt();

    let (mut box_w, mut box_h) = if ratio > 0.0 {
        // Largest ratio-constrained box that fits, then scaled by coverage
        let fit_w = surface_w.min(surface_h * ratio);
        (fit_w * scale, fit_w / ratio * scale)
    } else {
        (surface_w * scale, surface_h * scale)
    };

    box_w = box_w.min(surface_w);
    box_h = box_h.min(surface_h);

    let rect = CropRect::new(
        (surface_w - box_w) / 2.0,
        (surface_h - box_h) / 2.0,
        box_w,
        box_h,
    );
    clamp_rect(rect, width, height, config)
}

/// Clamp a crop box to the surface and the minimum box size.
fn clamp_rect(rect: CropRect, width: u32, height: u32, config: &CropperConfig) -> CropRect {
    let surface_w = width as f64;
    let surface_h = height as f64;

    let min_w = (config.min_crop_box_width as f64).min(surface_w);
    let min_h = (config.min_crop_box_height as f64).min(surface_h);

    let w = rect.width.clamp(min_w, surface_w);
    let h = rect.height.clamp(min_h, surface_h);
    let x = rect.x.clamp(0.0, surface_w - w);
    let y = rect.y.clamp(0.0, surface_h - h);

    CropRect::new(x, y, w, h)
}

impl EditingInstance for SoftwareCropper {
    fn is_ready(&self) -> bool {
        self.ready && !self.disposed
    }

    fn set_aspect_ratio(&mut self, ratio: f64) {
        self.aspect_ratio = ratio.max(0.0);
        self.refit_crop_box();
    }

    fn zoom_to(&mut self, level: f64) {
        self.zoom = level.clamp(0.0, 1.0);
        self.refit_crop_box();
    }

    fn rotate(&mut self, degrees: f64) {
        self.rotation += degrees;
        self.refit_crop_box();
    }

    fn crop_rect(&self) -> CropRect {
        self.crop_rect
    }

    fn cropped_canvas(&self, options: &CanvasOptions) -> Option<Canvas> {
        if !self.is_ready() {
            return None;
        }

        let surface = rotate(&self.source, self.rotation, options.fill);
        let rect = self.crop_rect;
        let cropped = crop(&surface, rect.x, rect.y, rect.width, rect.height);
        Some(shrink_to_fit(
            &cropped,
            options.max_width,
            options.max_height,
            options.smoothing,
        ))
    }

    fn dispose(&mut self) {
        // Drop the pixel buffer now; the handle itself may linger.
        self.source = Canvas::new(0, 0, Vec::new());
        self.ready = false;
        self.disposed = true;
    }
}

/// Factory producing [`SoftwareCropper`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCropperFactory;

impl InstanceFactory for SoftwareCropperFactory {
    type Instance = SoftwareCropper;

    fn bind(&self, source: &Canvas, config: &CropperConfig) -> SoftwareCropper {
        SoftwareCropper::bind(source.clone(), config.clone())
    }
}
