//! Pixel-coordinate cropping.

use crate::source::Canvas;

/// Copy a rectangular region out of a canvas.
///
/// The rectangle is given in pixel coordinates as the crop widget reports
/// them (fractional values are rounded). Coordinates extending beyond the
/// canvas are clamped; the output is never smaller than 1x1.
///
/// # Arguments
///
/// * `canvas` - Source canvas
/// * `x`, `y` - Top-left corner of the crop rectangle
/// * `width`, `height` - Rectangle dimensions
pub fn crop(canvas: &Canvas, x: f64, y: f64, width: f64, height: f64) -> Canvas {
    let src_w = canvas.width;
    let src_h = canvas.height;

    // Full-canvas crop is a copy
    if x <= 0.0 && y <= 0.0 && width >= src_w as f64 && height >= src_h as f64 {
        return canvas.clone();
    }

    let px_x = (x.max(0.0).round() as u32).min(src_w.saturating_sub(1));
    let px_y = (y.max(0.0).round() as u32).min(src_h.saturating_sub(1));
    let px_right = (px_x + width.max(0.0).round() as u32).min(src_w);
    let px_bottom = (px_y + height.max(0.0).round() as u32).min(src_h);

    let out_w = px_right.saturating_sub(px_x).max(1);
    let out_h = px_bottom.saturating_sub(px_y).max(1);

    let mut output = vec![0u8; (out_w * out_h * 3) as usize];

    for row in 0..out_h {
        let src_start = (((px_y + row) * src_w + px_x) * 3) as usize;
        let src_end = src_start + (out_w * 3) as usize;
        let dst_start = (row * out_w * 3) as usize;
        let dst_end = dst_start + (out_w * 3) as usize;
        output[dst_start..dst_end].copy_from_slice(&canvas.pixels[src_start..src_end]);
    }

    Canvas::new(out_w, out_h, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_canvas() -> impl Strategy<Value = Canvas> {
        (2u32..=64, 2u32..=64).prop_map(|(w, h)| {
            let mut pixels = Vec::with_capacity((w * h * 3) as usize);
            for i in 0..w * h {
                let v = (i % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
            Canvas::new(w, h, pixels)
        })
    }

    proptest! {
        /// Output is always at least 1x1 and never larger than the input.
        #[test]
        fn prop_output_bounded(
            canvas in any_canvas(),
            x in -10.0f64..100.0,
            y in -10.0f64..100.0,
            w in 0.0f64..100.0,
            h in 0.0f64..100.0,
        ) {
            let result = crop(&canvas, x, y, w, h);
            prop_assert!(result.width >= 1 && result.width <= canvas.width);
            prop_assert!(result.height >= 1 && result.height <= canvas.height);
            prop_assert_eq!(
                result.pixels.len(),
                (result.width * result.height * 3) as usize
            );
        }

        /// Cropping is deterministic.
        #[test]
        fn prop_deterministic(
            canvas in any_canvas(),
            x in 0.0f64..32.0,
            y in 0.0f64..32.0,
            w in 1.0f64..64.0,
            h in 1.0f64..64.0,
        ) {
            let a = crop(&canvas, x, y, w, h);
            let b = crop(&canvas, x, y, w, h);
            prop_assert_eq!(a, b);
        }

        /// An oversized rectangle returns the whole canvas.
        #[test]
        fn prop_oversized_is_identity(canvas in any_canvas()) {
            let result = crop(&canvas, 0.0, 0.0, 10_000.0, 10_000.0);
            prop_assert_eq!(result, canvas);
        }
    }
}
