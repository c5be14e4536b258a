//! Pure Rust filter backend.
//!
//! ## Filter mapping
//!
//! | Filter | Implementation |
//! |---|---|
//! | Grayscale, Sepia, Negative | [`color`](super::color) per-pixel maps |
//! | Brightness, Contrast, Saturation | [`color`](super::color) per-pixel maps |
//! | Posterize, Vignette | [`color`](super::color) per-pixel maps |
//! | Blur | running-sum separable box blur ([`convolve`](super::convolve)) |
//! | Sharpen, Edge Detection | 3x3 kernels ([`convolve`](super::convolve)) |
//! | Rotate (quarter turns), Flip | `image::DynamicImage::rotate90` / `fliph` / `flipv` |
//! | Rotate (other angles) | inverse-mapped bilinear sampling ([`geometry`](super::geometry)) |
//! | Crop | clamped sub-rectangle copy |
//! | Resize | `image::DynamicImage::resize_exact` with `Triangle` filter |

use super::backend::{FilterBackend, FilterError};
use super::params::FilterSpec;
use super::{color, convolve, geometry};
use crate::buffer::PixelBuffer;

/// Pure Rust backend. Stateless; one instance can serve every worker.
///
/// See the [module docs](self) for the filter-to-function mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBackend for RustBackend {
    fn apply(&self, source: &PixelBuffer, spec: &FilterSpec) -> Result<PixelBuffer, FilterError> {
        spec.validate()?;
        let out = match *spec {
            FilterSpec::Grayscale => color::grayscale(source),
            FilterSpec::Sepia => color::sepia(source),
            FilterSpec::Negative => color::negative(source),
            FilterSpec::Brightness(v) => color::brightness(source, v),
            FilterSpec::Contrast(v) => color::contrast(source, v),
            FilterSpec::Saturation(v) => color::saturation(source, v),
            FilterSpec::Blur(radius) => convolve::box_blur(source, radius),
            FilterSpec::Sharpen => convolve::sharpen(source),
            FilterSpec::EdgeDetection => convolve::edge_detect(source),
            FilterSpec::Posterize(levels) => color::posterize(source, levels),
            FilterSpec::Vignette(intensity) => color::vignette(source, intensity),
            FilterSpec::Rotate(degrees) => geometry::rotate(source, degrees)?,
            FilterSpec::Flip { horizontal } => geometry::flip(source, horizontal)?,
            FilterSpec::Crop(rect) => geometry::crop(source, &rect),
            FilterSpec::Resize(scale) => geometry::resize(source, scale)?,
        };
        Ok(out)
    }
}
