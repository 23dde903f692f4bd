//! Downscaling to fit the extraction dimension caps.

use crate::source::Canvas;

/// Interpolation quality used when a canvas must be downscaled.
///
/// Mirrors the crop widget's image-smoothing switch: extraction runs with
/// smoothing enabled at high quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    /// No smoothing (nearest neighbor).
    Off,
    /// High-quality smoothing (Lanczos3).
    #[default]
    High,
}

impl Smoothing {
    fn filter(self) -> image::imageops::FilterType {
        match self {
            Smoothing::Off => image::imageops::FilterType::Nearest,
            Smoothing::High => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Shrink a canvas to fit within the given dimension caps.
///
/// Aspect ratio is preserved. A canvas already within the caps is
/// returned unchanged; this operation never upscales. Zero caps are
/// treated as a 1-pixel cap so the output is always drawable.
pub fn shrink_to_fit(canvas: &Canvas, max_width: u32, max_height: u32, smoothing: Smoothing) -> Canvas {
    let max_w = max_width.max(1);
    let max_h = max_height.max(1);

    if canvas.width <= max_w && canvas.height <= max_h {
        return canvas.clone();
    }

    let scale = (max_w as f64 / canvas.width as f64).min(max_h as f64 / canvas.height as f64);
    let new_w = ((canvas.width as f64 * scale).round() as u32).clamp(1, max_w);
    let new_h = ((canvas.height as f64 * scale).round() as u32).clamp(1, max_h);

    let rgb = match canvas.to_rgb_image() {
        Some(img) => img,
        // Inconsistent buffer; nothing sensible to resize.
        None => return canvas.clone(),
    };

    let resized = image::imageops::resize(&rgb, new_w, new_h, smoothing.filter());
    Canvas::from_rgb_image(resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_caps_unchanged() {
        let canvas = Canvas::filled(100, 80, [10, 20, 30]);
        let result = shrink_to_fit(&canvas, 200, 200, Smoothing::High);
        assert_eq!(result, canvas);
    }

    #[test]
    fn test_shrinks_preserving_aspect() {
        let canvas = Canvas::filled(400, 200, [10, 20, 30]);
        let result = shrink_to_fit(&canvas, 100, 100, Smoothing::High);
        assert_eq!(result.width, 100);
        assert_eq!(result.height, 50);
    }

    #[test]
    fn test_height_constrained() {
        let canvas = Canvas::filled(200, 400, [10, 20, 30]);
        let result = shrink_to_fit(&canvas, 100, 100, Smoothing::High);
        assert_eq!(result.width, 50);
        assert_eq!(result.height, 100);
    }

    #[test]
    fn test_never_upscales() {
        let canvas = Canvas::filled(10, 10, [0, 0, 0]);
        let result = shrink_to_fit(&canvas, 1000, 1000, Smoothing::High);
        assert_eq!(result.width, 10);
        assert_eq!(result.height, 10);
    }

    #[test]
    fn test_zero_cap_clamped() {
        let canvas = Canvas::filled(10, 10, [0, 0, 0]);
        let result = shrink_to_fit(&canvas, 0, 0, Smoothing::Off);
        assert_eq!(result.width, 1);
        assert_eq!(result.height, 1);
    }

    #[test]
    fn test_deterministic() {
        let canvas = Canvas::filled(300, 200, [100, 150, 200]);
        let a = shrink_to_fit(&canvas, 64, 64, Smoothing::High);
        let b = shrink_to_fit(&canvas, 64, 64, Smoothing::High);
        assert_eq!(a, b);
    }
}
