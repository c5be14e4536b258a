//! Pure calculation functions for pixel math and image geometry.
//!
//! All functions here are pure and testable without any buffers.

use crate::buffer::Rect;

use super::params::CropRect;

/// Rec. 601 luma of an RGB triple, unrounded.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Rec. 601 luma rounded to the nearest channel value.
#[inline]
pub fn luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    clamp_round(luminance(r, g, b))
}

/// Clamp to `0..=255` and round half away from zero.
#[inline]
pub fn clamp_round(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Clamp to `0..=255` and truncate toward zero.
#[inline]
pub fn clamp_trunc(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Partition an image into a row-major grid of tiles.
///
/// The last column and row are truncated to the remaining pixels, so the
/// tiles exactly cover the image without overlap.
///
/// # Arguments
/// * `dims` - Image dimensions (width, height)
/// * `tile_size` - Edge length of a full tile (must be non-zero)
///
/// # Returns
/// * Tiles in row-major order; the index in the vector is the tile index
pub fn tile_grid(dims: (u32, u32), tile_size: u32) -> Vec<Rect> {
    let (w, h) = dims;
    let mut tiles = Vec::with_capacity(tile_count(dims, tile_size));
    let mut y = 0;
    while y < h {
        let th = tile_size.min(h - y);
        let mut x = 0;
        while x < w {
            let tw = tile_size.min(w - x);
            tiles.push(Rect::new(x, y, tw, th));
            x += tile_size;
        }
        y += tile_size;
    }
    tiles
}

/// Number of tiles [`tile_grid`] produces: `ceil(W/size) * ceil(H/size)`.
pub fn tile_count(dims: (u32, u32), tile_size: u32) -> usize {
    let (w, h) = dims;
    w.div_ceil(tile_size) as usize * h.div_ceil(tile_size) as usize
}

/// Grow `rect` by `halo` pixels on every side, clipped to the image.
///
/// # Returns
/// * `(expanded, inner)` - The padded rectangle in image coordinates, and the
///   original rectangle expressed relative to the padded one
pub fn expand_rect(rect: Rect, halo: u32, dims: (u32, u32)) -> (Rect, Rect) {
    let (w, h) = dims;
    let x0 = rect.x.saturating_sub(halo);
    let y0 = rect.y.saturating_sub(halo);
    let x1 = (rect.x + rect.width).saturating_add(halo).min(w);
    let y1 = (rect.y + rect.height).saturating_add(halo).min(h);
    (
        Rect::new(x0, y0, x1 - x0, y1 - y0),
        Rect::new(rect.x - x0, rect.y - y0, rect.width, rect.height),
    )
}

/// Clamp a crop request to the image.
///
/// `left`/`top` are clamped into `0..dim`, and width/height to the remaining
/// extent with a minimum of one pixel. Never fails.
pub fn clamp_crop(crop: &CropRect, dims: (u32, u32)) -> Rect {
    let (w, h) = (dims.0 as i64, dims.1 as i64);
    let left = (crop.left as i64).clamp(0, w - 1);
    let top = (crop.top as i64).clamp(0, h - 1);
    let width = crop.width().clamp(1, w - left);
    let height = crop.height().clamp(1, h - top);
    Rect::new(left as u32, top as u32, width as u32, height as u32)
}

/// Bounding box of a `dims` image rotated by `degrees`, rounded to whole
/// pixels (minimum 1).
pub fn rotated_bounds(dims: (u32, u32), degrees: f64) -> (u32, u32) {
    let (w, h) = (dims.0 as f64, dims.1 as f64);
    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let bw = (w * cos + h * sin).round().max(1.0);
    let bh = (w * sin + h * cos).round().max(1.0);
    (bw as u32, bh as u32)
}

/// Dimensions after a uniform scale, truncated toward zero (minimum 1).
/// `None` when either side does not fit in a `u32`.
pub fn scaled_dimensions(dims: (u32, u32), scale: f32) -> Option<(u32, u32)> {
    let side = |d: u32| {
        let scaled = (d as f64 * scale as f64).trunc();
        (scaled <= u32::MAX as f64).then(|| (scaled as u32).max(1))
    };
    Some((side(dims.0)?, side(dims.1)?))
}

/// Dimensions that fit inside a `max_size` square, preserving aspect ratio.
/// Images already inside the box are returned unchanged (never upscales).
///
/// # Examples
/// ```
/// # use tessera::imaging::fit_within;
/// assert_eq!(fit_within((2048, 1024), 512), (512, 256));
/// assert_eq!(fit_within((300, 200), 512), (300, 200));
/// ```
pub fn fit_within(dims: (u32, u32), max_size: u32) -> (u32, u32) {
    let (w, h) = dims;
    let longer = w.max(h);
    if longer <= max_size {
        return dims;
    }
    let ratio = max_size as f64 / longer as f64;
    let fw = ((w as f64 * ratio).round() as u32).max(1);
    let fh = ((h as f64 * ratio).round() as u32).max(1);
    (fw, fh)
}
