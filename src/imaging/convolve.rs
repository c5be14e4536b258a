//! Neighbourhood filters: box blur, sharpen and Sobel edge detection.
//!
//! These read pixels around the one being written, so their output near a
//! buffer edge depends on where the edge is. When the scheduler filters tiles
//! independently the tile edge acts as an image edge; see
//! [`SeamPolicy`](crate::tiling::SeamPolicy) for the halo option that avoids it.

use super::calculations::luminance_u8;
use super::params::MAX_BLUR_RADIUS;
use crate::buffer::PixelBuffer;

/// Separable box blur over `[-radius, +radius]` with clamp-to-edge addressing.
///
/// Horizontal pass into a scratch buffer, then a vertical pass into the
/// result. Each output is the integer mean of `2 * radius + 1` samples.
/// The radius is clamped to `1..=25`; alpha is copied from the source.
pub fn box_blur(src: &PixelBuffer, radius: u32) -> PixelBuffer {
    let r = radius.clamp(1, MAX_BLUR_RADIUS) as i64;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let n = src.channels().count();
    let window = (2 * r + 1) as u32;
    let data = src.data();

    // Horizontal pass with a running sum per channel.
    let mut temp = data.to_vec();
    for y in 0..h {
        let row = y * w * n;
        let at = |x: i64, c: usize| data[row + x.clamp(0, w as i64 - 1) as usize * n + c] as u32;
        for c in 0..3 {
            let mut sum: u32 = (-r..=r).map(|i| at(i, c)).sum();
            for x in 0..w as i64 {
                temp[row + x as usize * n + c] = (sum / window) as u8;
                sum = sum + at(x + r + 1, c) - at(x - r, c);
            }
        }
    }

    // Vertical pass.
    let mut out = temp.clone();
    for x in 0..w {
        let at = |y: i64, c: usize| {
            temp[y.clamp(0, h as i64 - 1) as usize * w * n + x * n + c] as u32
        };
        for c in 0..3 {
            let mut sum: u32 = (-r..=r).map(|i| at(i, c)).sum();
            for y in 0..h as i64 {
                out[y as usize * w * n + x * n + c] = (sum / window) as u8;
                sum = sum + at(y + r + 1, c) - at(y - r, c);
            }
        }
    }

    src.with_data(out)
}

const SHARPEN: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// 3x3 sharpen kernel on interior pixels. The one-pixel border is copied
/// unchanged, as is alpha.
pub fn sharpen(src: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let n = src.channels().count();
    let data = src.data();
    let mut out = data.to_vec();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            for c in 0..3 {
                let mut acc = 0i32;
                for (ky, row) in SHARPEN.iter().enumerate() {
                    for (kx, weight) in row.iter().enumerate() {
                        let i = ((y + ky - 1) * w + (x + kx - 1)) * n + c;
                        acc += data[i] as i32 * weight;
                    }
                }
                out[(y * w + x) * n + c] = acc.clamp(0, 255) as u8;
            }
        }
    }

    src.with_data(out)
}

/// Sobel gradient magnitude of the luminance plane, written as gray.
/// Border pixels keep their source values, alpha is copied.
pub fn edge_detect(src: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let n = src.channels().count();
    let data = src.data();
    let luma: Vec<i32> = data
        .chunks_exact(n)
        .map(|px| luminance_u8(px[0], px[1], px[2]) as i32)
        .collect();
    let mut out = data.to_vec();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let (mut gx, mut gy) = (0i32, 0i32);
            for ky in 0..3 {
                for kx in 0..3 {
                    let l = luma[(y + ky - 1) * w + (x + kx - 1)];
                    gx += l * SOBEL_X[ky][kx];
                    gy += l * SOBEL_Y[ky][kx];
                }
            }
            let magnitude = ((gx * gx + gy * gy) as f64).sqrt().min(255.0) as u8;
            let i = (y * w + x) * n;
            out[i..i + 3].fill(magnitude);
        }
    }

    src.with_data(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    fn checker(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, Channels::Rgb, |x, y| {
            let v = if (x + y) % 2 == 0 { 200 } else { 40 };
            [v, v, v, 0]
        })
        .unwrap()
    }

    /// Direct (non-running-sum) box blur, for cross-checking.
    fn naive_blur(src: &PixelBuffer, r: i64) -> PixelBuffer {
        let (w, h) = (src.width() as i64, src.height() as i64);
        let n = src.channels().count();
        let window = (2 * r + 1) as u32;
        let mut temp = src.data().to_vec();
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    let s: u32 = (-r..=r)
                        .map(|i| src.pixel((x + i).clamp(0, w - 1) as u32, y as u32)[c] as u32)
                        .sum();
                    temp[((y * w + x) as usize) * n + c] = (s / window) as u8;
                }
            }
        }
        let mut out = temp.clone();
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    let s: u32 = (-r..=r)
                        .map(|i| temp[(((y + i).clamp(0, h - 1) * w + x) as usize) * n + c] as u32)
                        .sum();
                    out[((y * w + x) as usize) * n + c] = (s / window) as u8;
                }
            }
        }
        PixelBuffer::new(src.width(), src.height(), src.channels(), out).unwrap()
    }

    #[test]
    fn blur_of_uniform_image_is_unchanged() {
        let src = PixelBuffer::filled(30, 20, Channels::Rgba, &[90, 120, 33, 7]).unwrap();
        assert_eq!(box_blur(&src, 5), src);
    }

    #[test]
    fn blur_matches_direct_summation() {
        let src = PixelBuffer::from_fn(23, 17, Channels::Rgb, |x, y| {
            [(x * 11) as u8, (y * 13) as u8, (x * y) as u8, 0]
        })
        .unwrap();
        for r in [1, 3, 9] {
            assert_eq!(box_blur(&src, r), naive_blur(&src, r as i64), "radius {r}");
        }
    }

    #[test]
    fn blur_clamps_radius() {
        let src = checker(60, 60);
        assert_eq!(box_blur(&src, 100), box_blur(&src, MAX_BLUR_RADIUS));
    }

    #[test]
    fn blur_smooths_checkerboard() {
        let out = box_blur(&checker(20, 20), 1);
        let px = out.pixel(10, 10)[0];
        assert!(px > 40 && px < 200);
    }

    #[test]
    fn blur_keeps_alpha() {
        let src = PixelBuffer::from_fn(8, 8, Channels::Rgba, |x, y| {
            [(x * 30) as u8, 0, 0, (y * 30) as u8]
        })
        .unwrap();
        let out = box_blur(&src, 2);
        for y in 0..8 {
            assert_eq!(out.pixel(3, y)[3], src.pixel(3, y)[3]);
        }
    }

    #[test]
    fn sharpen_keeps_border_and_flat_regions() {
        let src = PixelBuffer::filled(10, 10, Channels::Rgb, &[100, 100, 100]).unwrap();
        // 5*100 - 4*100 = 100
        assert_eq!(sharpen(&src), src);
    }

    #[test]
    fn sharpen_amplifies_a_spike() {
        let src = PixelBuffer::from_fn(5, 5, Channels::Rgb, |x, y| {
            let v = if x == 2 && y == 2 { 100 } else { 50 };
            [v, v, v, 0]
        })
        .unwrap();
        let out = sharpen(&src);
        // 5*100 - 4*50 = 300 → 255
        assert_eq!(out.pixel(2, 2), &[255, 255, 255]);
        // neighbour: 5*50 - 100 - 3*50 = 0
        assert_eq!(out.pixel(2, 1), &[0, 0, 0]);
        assert_eq!(out.pixel(0, 0), src.pixel(0, 0));
    }

    #[test]
    fn edges_of_flat_image_are_black_inside() {
        let src = PixelBuffer::filled(6, 6, Channels::Rgb, &[180, 20, 90]).unwrap();
        let out = edge_detect(&src);
        assert_eq!(out.pixel(3, 3), &[0, 0, 0]);
        // Border keeps the source colour.
        assert_eq!(out.pixel(0, 3), &[180, 20, 90]);
    }

    #[test]
    fn edge_on_vertical_step() {
        let src = PixelBuffer::from_fn(6, 6, Channels::Rgb, |x, _| {
            let v = if x < 3 { 0 } else { 100 };
            [v, v, v, 0]
        })
        .unwrap();
        let out = edge_detect(&src);
        // gx = (1 + 2 + 1) * 100 = 400 → clamped to 255
        assert_eq!(out.pixel(2, 2), &[255, 255, 255]);
        assert_eq!(out.pixel(3, 2)[0], 255);
        assert_eq!(out.pixel(4, 2)[0], 0);
        assert_eq!(out.pixel(1, 2)[0], 0);
    }

    #[test]
    fn tiny_buffers_pass_through() {
        let src = PixelBuffer::filled(2, 1, Channels::Rgb, &[1, 2, 3]).unwrap();
        assert_eq!(sharpen(&src), src);
        assert_eq!(edge_detect(&src), src);
    }
}
