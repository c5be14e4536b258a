//! Pointwise color filters.
//!
//! Each function reads one pixel and writes one pixel, so a tile of the image
//! filtered on its own gives the same bytes as the same region of the whole
//! image filtered at once. Vignette is the exception: it depends on the pixel
//! position relative to the buffer centre.
//!
//! Alpha is always passed through untouched.

use super::calculations::{clamp_trunc, luminance_u8};
use crate::buffer::PixelBuffer;

pub fn grayscale(src: &PixelBuffer) -> PixelBuffer {
    src.map_rgb(|_, _, [r, g, b]| {
        let l = luminance_u8(r, g, b);
        [l, l, l]
    })
}

pub fn sepia(src: &PixelBuffer) -> PixelBuffer {
    src.map_rgb(|_, _, [r, g, b]| {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        [
            clamp_trunc(0.393 * r + 0.769 * g + 0.189 * b),
            clamp_trunc(0.349 * r + 0.686 * g + 0.168 * b),
            clamp_trunc(0.272 * r + 0.534 * g + 0.131 * b),
        ]
    })
}

pub fn negative(src: &PixelBuffer) -> PixelBuffer {
    src.map_rgb(|_, _, [r, g, b]| [255 - r, 255 - g, 255 - b])
}

/// Shift every channel by `round(value * 2.55)`.
///
/// The product is computed as `value * 255 / 100` so that `50.0` lands
/// exactly on `127.5` and rounds up to 128.
pub fn brightness(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let adjustment = (value * 255.0 / 100.0).round() as i32;
    let shift = |c: u8| (c as i32 + adjustment).clamp(0, 255) as u8;
    src.map_rgb(|_, _, [r, g, b]| [shift(r), shift(g), shift(b)])
}

/// Classic contrast curve pivoting on 128.
///
/// `value` must stay away from 259, where the factor divides by zero; the
/// accepted range of -100..=100 guarantees that.
pub fn contrast(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let factor = (259.0 * (value + 255.0)) / (255.0 * (259.0 - value));
    let adjust = |c: u8| clamp_trunc(factor * (c as f32 - 128.0) + 128.0);
    src.map_rgb(|_, _, [r, g, b]| [adjust(r), adjust(g), adjust(b)])
}

/// Interpolate each channel away from (or toward) the pixel's luminance.
/// `-100` produces grayscale, `0` is the identity.
pub fn saturation(src: &PixelBuffer, value: f32) -> PixelBuffer {
    let factor = 1.0 + value / 100.0;
    src.map_rgb(|_, _, [r, g, b]| {
        let gray = luminance_u8(r, g, b) as f32;
        let adjust = |c: u8| clamp_trunc(gray + factor * (c as f32 - gray));
        [adjust(r), adjust(g), adjust(b)]
    })
}

/// Quantize each channel down to a multiple of `255 / (levels - 1)`.
///
/// The bucket index is capped at `levels - 1` so the output never has more
/// than `levels` distinct values per channel, even when the integer step
/// leaves a remainder at the top of the range. The top level is therefore
/// `(levels - 1) * step`, which is 255 only when `levels - 1` divides 255.
/// Otherwise every value above it clips down to it: with 200 levels
/// (step 1) the range `199..=255` all becomes 199.
pub fn posterize(src: &PixelBuffer, levels: u32) -> PixelBuffer {
    let levels = levels.clamp(2, 256);
    let step = 255 / (levels - 1);
    let quantize = |c: u8| {
        let bucket = (c as u32 / step).min(levels - 1);
        (bucket * step).min(255) as u8
    };
    src.map_rgb(|_, _, [r, g, b]| [quantize(r), quantize(g), quantize(b)])
}

/// Darken pixels in proportion to their distance from the centre.
pub fn vignette(src: &PixelBuffer, intensity: f32) -> PixelBuffer {
    let cx = src.width() as f32 / 2.0;
    let cy = src.height() as f32 / 2.0;
    let max_radius = (cx * cx + cy * cy).sqrt();
    src.map_rgb(|x, y, [r, g, b]| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        let factor = 1.0 - (distance / max_radius * intensity).clamp(0.0, 1.0);
        [
            clamp_trunc(r as f32 * factor),
            clamp_trunc(g as f32 * factor),
            clamp_trunc(b as f32 * factor),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use std::collections::HashSet;

    fn noise(w: u32, h: u32, channels: Channels) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, channels, |x, y| {
            let v = x.wrapping_mul(73).wrapping_add(y.wrapping_mul(151)) ^ (x * y);
            [v as u8, (v >> 3) as u8, (v >> 5) as u8 ^ 0x5a, (x + y) as u8]
        })
        .unwrap()
    }

    #[test]
    fn negative_twice_is_identity() {
        let src = noise(37, 23, Channels::Rgba);
        assert_eq!(negative(&negative(&src)), src);
    }

    #[test]
    fn grayscale_channels_are_equal() {
        let out = grayscale(&noise(40, 30, Channels::Rgb));
        for px in out.data().chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn grayscale_keeps_alpha() {
        let src = PixelBuffer::filled(2, 2, Channels::Rgba, &[200, 100, 50, 9]).unwrap();
        // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        assert_eq!(grayscale(&src).pixel(0, 0), &[124, 124, 124, 9]);
    }

    #[test]
    fn sepia_clamps_bright_pixels() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[255, 255, 255]).unwrap();
        // tb = 0.937 * 255 = 238.9 → 238
        assert_eq!(sepia(&src).pixel(0, 0), &[255, 255, 238]);
    }

    #[test]
    fn brightness_plus_fifty_adds_128() {
        let src = PixelBuffer::filled(512, 512, Channels::Rgb, &[10, 10, 10]).unwrap();
        let out = brightness(&src, 50.0);
        assert!(out.data().iter().all(|&c| c == 138));
    }

    #[test]
    fn brightness_clamps_at_both_ends() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[200, 100, 5]).unwrap();
        assert_eq!(brightness(&src, 50.0).pixel(0, 0), &[255, 228, 133]);
        assert_eq!(brightness(&src, -100.0).pixel(0, 0), &[0, 0, 0]);
    }

    #[test]
    fn contrast_zero_is_identity() {
        let src = noise(16, 16, Channels::Rgb);
        assert_eq!(contrast(&src, 0.0), src);
    }

    #[test]
    fn contrast_spreads_values_from_midpoint() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[100, 128, 160]).unwrap();
        let out = contrast(&src, 50.0);
        let px = out.pixel(0, 0);
        assert!(px[0] < 100);
        assert_eq!(px[1], 128);
        assert!(px[2] > 160);
    }

    #[test]
    fn saturation_minus_hundred_is_gray() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[200, 100, 50]).unwrap();
        assert_eq!(saturation(&src, -100.0).pixel(0, 0), &[124, 124, 124]);
    }

    #[test]
    fn saturation_zero_is_identity() {
        let src = noise(16, 16, Channels::Rgb);
        assert_eq!(saturation(&src, 0.0), src);
    }

    #[test]
    fn posterize_limits_distinct_levels() {
        let src = PixelBuffer::from_fn(256, 1, Channels::Rgb, |x, _| {
            [x as u8, 255 - x as u8, (x * 7) as u8, 0]
        })
        .unwrap();
        for levels in [2, 3, 4, 8] {
            let out = posterize(&src, levels);
            for c in 0..3 {
                let distinct: HashSet<u8> = out.data().chunks_exact(3).map(|p| p[c]).collect();
                assert!(
                    distinct.len() <= levels as usize,
                    "{levels} levels produced {} values",
                    distinct.len()
                );
            }
        }
    }

    #[test]
    fn posterize_top_level_clips_highlights() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[198, 199, 255]).unwrap();
        assert_eq!(posterize(&src, 200).pixel(0, 0), &[198, 199, 199]);
        // 255 / 3 = 85 divides evenly, so white survives.
        let white = PixelBuffer::filled(1, 1, Channels::Rgb, &[255, 255, 255]).unwrap();
        assert_eq!(posterize(&white, 4).pixel(0, 0), &[255, 255, 255]);
    }

    #[test]
    fn posterize_two_levels_is_binary() {
        let src = PixelBuffer::filled(1, 1, Channels::Rgb, &[0, 254, 255]).unwrap();
        assert_eq!(posterize(&src, 2).pixel(0, 0), &[0, 0, 255]);
    }

    #[test]
    fn vignette_keeps_centre_and_darkens_corner() {
        let src = PixelBuffer::filled(101, 101, Channels::Rgb, &[200, 200, 200]).unwrap();
        let out = vignette(&src, 1.0);
        // Centre is (50.5, 50.5): pixel (50, 50) sits half a pixel away.
        assert!(out.pixel(50, 50)[0] >= 198);
        assert!(out.pixel(0, 0)[0] < 10);
    }

    #[test]
    fn vignette_zero_intensity_is_identity() {
        let src = noise(20, 10, Channels::Rgb);
        assert_eq!(vignette(&src, 0.0), src);
    }
}
