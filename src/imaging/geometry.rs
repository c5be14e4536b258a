//! Geometric transforms: rotate, flip, crop and resize.
//!
//! Lossless cases (quarter turns, mirrors, crops) and resampling are delegated
//! to the `image` crate. Arbitrary-angle rotation is done here with inverse
//! mapping and bilinear sampling.

use super::backend::FilterError;
use super::calculations::{clamp_crop, rotated_bounds, scaled_dimensions};
use super::params::CropRect;
use crate::buffer::{BufferError, PixelBuffer};
use image::imageops::FilterType;

/// Rotate clockwise by `degrees` about the image centre.
///
/// Quarter turns are exact. Other angles grow the canvas to the rotated
/// bounding box; pixels that map outside the source are zero (transparent
/// for RGBA, black for RGB).
pub fn rotate(src: &PixelBuffer, degrees: i32) -> Result<PixelBuffer, BufferError> {
    let channels = src.channels();
    let img = || src.clone().into_dynamic_image();
    match degrees.rem_euclid(360) {
        0 => Ok(src.clone()),
        90 => PixelBuffer::from_dynamic_image_as(img().rotate90(), channels),
        180 => PixelBuffer::from_dynamic_image_as(img().rotate180(), channels),
        270 => PixelBuffer::from_dynamic_image_as(img().rotate270(), channels),
        d => rotate_arbitrary(src, d as f64),
    }
}

fn rotate_arbitrary(src: &PixelBuffer, degrees: f64) -> Result<PixelBuffer, BufferError> {
    let (sw, sh) = src.dimensions();
    let (ow, oh) = rotated_bounds((sw, sh), degrees);
    let n = src.channels().count();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (scx, scy) = (sw as f64 / 2.0, sh as f64 / 2.0);
    let (ocx, ocy) = (ow as f64 / 2.0, oh as f64 / 2.0);

    let sample = |x: i64, y: i64, c: usize| -> f64 {
        if x < 0 || y < 0 || x >= sw as i64 || y >= sh as i64 {
            0.0
        } else {
            src.pixel(x as u32, y as u32)[c] as f64
        }
    };

    let mut data = Vec::with_capacity(ow as usize * oh as usize * n);
    for oy in 0..oh {
        for ox in 0..ow {
            let dx = ox as f64 + 0.5 - ocx;
            let dy = oy as f64 + 0.5 - ocy;
            // Inverse of a clockwise rotation in y-down coordinates.
            let fx = dx * cos + dy * sin + scx - 0.5;
            let fy = -dx * sin + dy * cos + scy - 0.5;
            if fx <= -1.0 || fy <= -1.0 || fx >= sw as f64 || fy >= sh as f64 {
                data.extend(std::iter::repeat_n(0u8, n));
                continue;
            }
            let (x0, y0) = (fx.floor() as i64, fy.floor() as i64);
            let (tx, ty) = (fx - x0 as f64, fy - y0 as f64);
            for c in 0..n {
                let v = sample(x0, y0, c) * (1.0 - tx) * (1.0 - ty)
                    + sample(x0 + 1, y0, c) * tx * (1.0 - ty)
                    + sample(x0, y0 + 1, c) * (1.0 - tx) * ty
                    + sample(x0 + 1, y0 + 1, c) * tx * ty;
                data.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    PixelBuffer::new(ow, oh, src.channels(), data)
}

/// Mirror across the vertical axis (`horizontal == true`) or the horizontal one.
pub fn flip(src: &PixelBuffer, horizontal: bool) -> Result<PixelBuffer, BufferError> {
    let img = src.clone().into_dynamic_image();
    let flipped = if horizontal { img.fliph() } else { img.flipv() };
    PixelBuffer::from_dynamic_image_as(flipped, src.channels())
}

/// Crop to `rect` after clamping it to the image. Never fails on geometry.
pub fn crop(src: &PixelBuffer, rect: &CropRect) -> PixelBuffer {
    src.extract(clamp_crop(rect, src.dimensions()))
}

/// Uniform scale with triangle (bilinear) resampling. Output dimensions are
/// truncated, with a minimum of one pixel.
///
/// A scale whose output cannot be addressed (a side past `u32::MAX`, or a
/// byte count past `isize::MAX`) is an invalid parameter.
pub fn resize(src: &PixelBuffer, scale: f32) -> Result<PixelBuffer, FilterError> {
    let too_large = || {
        FilterError::invalid(
            "resize",
            format!(
                "scale {scale} is too large for a {}x{} image",
                src.width(),
                src.height()
            ),
        )
    };
    let (w, h) = scaled_dimensions(src.dimensions(), scale).ok_or_else(too_large)?;
    (w as usize)
        .checked_mul(h as usize)
        .and_then(|px| px.checked_mul(src.channels().count()))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or_else(too_large)?;
    if (w, h) == src.dimensions() {
        return Ok(src.clone());
    }
    Ok(resize_exact(src, w, h)?)
}

/// Resample to exactly `width` x `height`.
pub fn resize_exact(
    src: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, BufferError> {
    let img = src
        .clone()
        .into_dynamic_image()
        .resize_exact(width, height, FilterType::Triangle);
    PixelBuffer::from_dynamic_image_as(img, src.channels())
}
