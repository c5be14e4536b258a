//! Filter parameter types.
//!
//! [`FilterSpec`] describes *what* to do to a buffer, not *how*. It is the
//! interface between callers (the engine, the scheduler, the CLI) and the
//! [`backend`](super::backend) that does the pixel work. Specs are immutable
//! values with total equality and hashing so they can key the result cache.
//!
//! ## Parameter ranges
//!
//! | Filter | Parameter | Accepted |
//! |---|---|---|
//! | Brightness / Contrast / Saturation | adjustment | `-100.0..=100.0` |
//! | Blur | radius | `>= 1` (values above 25 are clamped to 25) |
//! | Posterize | levels | `2..=256` |
//! | Vignette | intensity | `0.0..=1.0` |
//! | Resize | scale | finite, `> 0` |
//! | Rotate / Flip / Crop | none | any value; geometry is clamped, never rejected |

use super::backend::FilterError;
use std::hash::{Hash, Hasher};

/// Largest box-blur radius; larger requests are clamped.
pub const MAX_BLUR_RADIUS: u32 = 25;

/// Bound of the brightness/contrast/saturation adjustment range.
pub const ADJUSTMENT_LIMIT: f32 = 100.0;

/// Crop rectangle in source pixel coordinates. May extend past the image or
/// start at negative coordinates; it is clamped when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Signed extent. Widened so `i32::MIN..i32::MAX` does not overflow.
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }
}

/// Grouping used by front ends to lay out filter pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCategory {
    Basic,
    Advanced,
    Transform,
}

/// A single filter application.
#[derive(Debug, Clone, Copy)]
pub enum FilterSpec {
    Grayscale,
    Sepia,
    Negative,
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Blur(u32),
    Sharpen,
    EdgeDetection,
    Posterize(u32),
    Vignette(f32),
    Rotate(i32),
    Flip { horizontal: bool },
    Crop(CropRect),
    Resize(f32),
}

impl FilterSpec {
    /// Stable identifier used by the string encoding and in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FilterSpec::Grayscale => "grayscale",
            FilterSpec::Sepia => "sepia",
            FilterSpec::Negative => "negative",
            FilterSpec::Brightness(_) => "brightness",
            FilterSpec::Contrast(_) => "contrast",
            FilterSpec::Saturation(_) => "saturation",
            FilterSpec::Blur(_) => "blur",
            FilterSpec::Sharpen => "sharpen",
            FilterSpec::EdgeDetection => "edge_detection",
            FilterSpec::Posterize(_) => "posterize",
            FilterSpec::Vignette(_) => "vignette",
            FilterSpec::Rotate(_) => "rotate",
            FilterSpec::Flip { .. } => "flip",
            FilterSpec::Crop(_) => "crop",
            FilterSpec::Resize(_) => "resize",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterSpec::Grayscale => "Grayscale",
            FilterSpec::Sepia => "Sepia",
            FilterSpec::Negative => "Negative",
            FilterSpec::Brightness(_) => "Brightness",
            FilterSpec::Contrast(_) => "Contrast",
            FilterSpec::Saturation(_) => "Saturation",
            FilterSpec::Blur(_) => "Blur",
            FilterSpec::Sharpen => "Sharpen",
            FilterSpec::EdgeDetection => "Edge Detection",
            FilterSpec::Posterize(_) => "Posterize",
            FilterSpec::Vignette(_) => "Vignette",
            FilterSpec::Rotate(_) => "Rotate",
            FilterSpec::Flip { .. } => "Flip",
            FilterSpec::Crop(_) => "Crop",
            FilterSpec::Resize(_) => "Resize",
        }
    }

    pub fn category(&self) -> FilterCategory {
        match self {
            FilterSpec::Grayscale
            | FilterSpec::Sepia
            | FilterSpec::Negative
            | FilterSpec::Brightness(_)
            | FilterSpec::Contrast(_)
            | FilterSpec::Saturation(_) => FilterCategory::Basic,
            FilterSpec::Blur(_)
            | FilterSpec::Sharpen
            | FilterSpec::EdgeDetection
            | FilterSpec::Posterize(_)
            | FilterSpec::Vignette(_) => FilterCategory::Advanced,
            FilterSpec::Rotate(_)
            | FilterSpec::Flip { .. }
            | FilterSpec::Crop(_)
            | FilterSpec::Resize(_) => FilterCategory::Transform,
        }
    }

    /// Whether the filter can be applied independently to each tile of a
    /// partition.
    ///
    /// Transforms move pixels across the whole image (or change its size) and
    /// vignette darkens relative to the image centre, so the scheduler hands
    /// them the full buffer as a single tile.
    pub fn is_tileable(&self) -> bool {
        !matches!(self, FilterSpec::Vignette(_)) && self.category() != FilterCategory::Transform
    }

    /// How far outside a pixel the filter reads, in pixels.
    pub fn halo(&self) -> u32 {
        match self {
            FilterSpec::Blur(radius) => (*radius).min(MAX_BLUR_RADIUS),
            FilterSpec::Sharpen | FilterSpec::EdgeDetection => 1,
            _ => 0,
        }
    }

    /// Reject parameters no algorithm can honour. Runs before any pixel work.
    pub fn validate(&self) -> Result<(), FilterError> {
        let name = self.kind_name();
        match *self {
            FilterSpec::Brightness(v) | FilterSpec::Contrast(v) | FilterSpec::Saturation(v) => {
                if !v.is_finite() || !(-ADJUSTMENT_LIMIT..=ADJUSTMENT_LIMIT).contains(&v) {
                    return Err(FilterError::invalid(
                        name,
                        format!("adjustment must be within -100..=100, got {v}"),
                    ));
                }
            }
            FilterSpec::Blur(radius) => {
                if radius == 0 {
                    return Err(FilterError::invalid(name, "radius must be at least 1"));
                }
            }
            FilterSpec::Posterize(levels) => {
                if !(2..=256).contains(&levels) {
                    return Err(FilterError::invalid(
                        name,
                        format!("levels must be within 2..=256, got {levels}"),
                    ));
                }
            }
            FilterSpec::Vignette(intensity) => {
                if !intensity.is_finite() || !(0.0..=1.0).contains(&intensity) {
                    return Err(FilterError::invalid(
                        name,
                        format!("intensity must be within 0..=1, got {intensity}"),
                    ));
                }
            }
            FilterSpec::Resize(scale) => {
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(FilterError::invalid(
                        name,
                        format!("scale must be positive, got {scale}"),
                    ));
                }
            }
            FilterSpec::Grayscale
            | FilterSpec::Sepia
            | FilterSpec::Negative
            | FilterSpec::Sharpen
            | FilterSpec::EdgeDetection
            | FilterSpec::Rotate(_)
            | FilterSpec::Flip { .. }
            | FilterSpec::Crop(_) => {}
        }
        Ok(())
    }

    /// Discriminant plus parameter bits. `-0.0` is folded into `0.0` so that
    /// equality and hashing agree.
    fn key(&self) -> (u8, [u32; 4]) {
        fn bits(v: f32) -> u32 {
            if v == 0.0 { 0 } else { v.to_bits() }
        }
        match *self {
            FilterSpec::Grayscale => (0, [0; 4]),
            FilterSpec::Sepia => (1, [0; 4]),
            FilterSpec::Negative => (2, [0; 4]),
            FilterSpec::Brightness(v) => (3, [bits(v), 0, 0, 0]),
            FilterSpec::Contrast(v) => (4, [bits(v), 0, 0, 0]),
            FilterSpec::Saturation(v) => (5, [bits(v), 0, 0, 0]),
            FilterSpec::Blur(r) => (6, [r, 0, 0, 0]),
            FilterSpec::Sharpen => (7, [0; 4]),
            FilterSpec::EdgeDetection => (8, [0; 4]),
            FilterSpec::Posterize(l) => (9, [l, 0, 0, 0]),
            FilterSpec::Vignette(v) => (10, [bits(v), 0, 0, 0]),
            FilterSpec::Rotate(d) => (11, [d as u32, 0, 0, 0]),
            FilterSpec::Flip { horizontal } => (12, [horizontal as u32, 0, 0, 0]),
            FilterSpec::Crop(r) => (
                13,
                [r.left as u32, r.top as u32, r.right as u32, r.bottom as u32],
            ),
            FilterSpec::Resize(s) => (14, [bits(s), 0, 0, 0]),
        }
    }
}

impl PartialEq for FilterSpec {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FilterSpec {}

impl Hash for FilterSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
