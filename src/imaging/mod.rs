//! Pixel work in pure Rust, no native libraries.
//!
//! | Concern | Module |
//! |---|---|
//! | **Filter description** | [`FilterSpec`] (`params`) and its string form (`codec`) |
//! | **Pointwise color** | `color` |
//! | **Neighbourhood** | `convolve` (box blur, sharpen, Sobel) |
//! | **Geometry** | `geometry` (rotate, flip, crop, resize) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for pixel and dimension math (unit testable)
//! - **Parameters**: [`FilterSpec`] and its validation
//! - **Backend**: [`FilterBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
pub mod codec;
mod color;
mod convolve;
mod geometry;
mod params;
pub mod rust_backend;

pub use backend::{FilterBackend, FilterError};
pub use calculations::fit_within;
pub use codec::{CodecError, decode_filters, encode_filters};
pub use geometry::resize_exact;
pub use params::{CropRect, FilterCategory, FilterSpec, MAX_BLUR_RADIUS};
pub use rust_backend::RustBackend;
