//! Rotation with a configurable fill color.
//!
//! The canvas is rotated about its center with the output expanded to the
//! rotated bounding box, the way the crop widget rotates its backing
//! image. Regions of the output that fall outside the source take the
//! fill color (the widget paints them with the extraction fill, not
//! black). Sampling is bilinear.

use crate::source::Canvas;

/// Compute the bounding-box dimensions of a rotated canvas.
///
/// Exact multiples of 90 degrees take a fast path so dimension swaps are
/// not distorted by floating-point rounding.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let normalized = degrees.rem_euclid(360.0);

    if normalized.abs() < 0.001 || (360.0 - normalized) < 0.001 {
        return (width, height);
    }
    if (normalized - 90.0).abs() < 0.001 || (normalized - 270.0).abs() < 0.001 {
        return (height, width);
    }
    if (normalized - 180.0).abs() < 0.001 {
        return (width, height);
    }

    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let (w, h) = (width as f64, height as f64);

    let out_w = (w * cos + h * sin).round() as u32;
    let out_h = (w * sin + h * cos).round() as u32;
    (out_w.max(1), out_h.max(1))
}

/// Rotate a canvas by an arbitrary angle.
///
/// # Arguments
///
/// * `canvas` - Source canvas
/// * `degrees` - Rotation angle, positive = counter-clockwise
/// * `fill` - RGB color for output pixels with no source coverage
///
/// # Returns
///
/// A new canvas sized to the rotated bounding box. An angle within a
/// thousandth of a degree of zero returns a plain copy.
pub fn rotate(canvas: &Canvas, degrees: f64, fill: [u8; 3]) -> Canvas {
    if degrees.rem_euclid(360.0) < 0.001 || degrees.rem_euclid(360.0) > 359.999 {
        return canvas.clone();
    }

    let (dst_w, dst_h) = rotated_bounds(canvas.width, canvas.height, degrees);
    let (src_w, src_h) = (canvas.width as f64, canvas.height as f64);

    // Inverse mapping: negate the angle so positive input rotates
    // counter-clockwise visually.
    let rad = -degrees.to_radians();
    let (sin, cos) = (rad.sin(), rad.cos());

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; (dst_w * dst_h * 3) as usize];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 - dst_cx;
            let dy = dst_y as f64 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx;
            let src_y = dx * sin + dy * cos + src_cy;

            let pixel = sample_bilinear(canvas, src_x, src_y).unwrap_or(fill);

            let idx = ((dst_y * dst_w + dst_x) * 3) as usize;
            output[idx..idx + 3].copy_from_slice(&pixel);
        }
    }

    Canvas::new(dst_w, dst_h, output)
}

/// Sample a pixel with bilinear interpolation.
///
/// Returns `None` for coordinates outside the source so the caller can
/// substitute the fill color.
fn sample_bilinear(canvas: &Canvas, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (canvas.width as i64, canvas.height as i64);

    if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return None;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w as usize - 1);
    let y1 = (y0 + 1).min(h as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let at = |px: usize, py: usize| -> [f64; 3] {
        let idx = (py * canvas.width as usize + px) * 3;
        [
            canvas.pixels[idx] as f64,
            canvas.pixels[idx + 1] as f64,
            canvas.pixels[idx + 2] as f64,
        ]
    };

    let p00 = at(x0, y0);
    let p10 = at(x1, y0);
    let p01 = at(x0, y1);
    let p11 = at(x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    Some(result)
}
