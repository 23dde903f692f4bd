//! Pixel transforms backing the software editing instance.
//!
//! These operations reproduce what the interactive crop widget does to
//! its backing canvas:
//! 1. Rotation (about the center, canvas expanded, fill color outside)
//! 2. Crop (pixel-coordinate rectangle, clamped to bounds)
//! 3. Shrink-to-fit (output dimension caps, never upscales)
//!
//! All functions return new [`Canvas`](crate::source::Canvas) values
//! without modifying the input, and are deterministic for fixed inputs.

mod crop;
mod resize;
mod rotate;

pub use crop::crop;
pub use resize::{shrink_to_fit, Smoothing};
pub use rotate::{rotate, rotated_bounds};
