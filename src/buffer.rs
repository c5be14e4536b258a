//! Owned raster buffers.
//!
//! [`PixelBuffer`] is the unit every algorithm in the crate operates on: a
//! row-major grid of 8-bit RGB or RGBA pixels. Buffers are never mutated once
//! handed to a filter (every transform allocates a new buffer), so the same
//! source can be read by any number of tile workers at once.
//!
//! Conversions to and from [`image::DynamicImage`] exist for the decode/encode
//! boundary and for the handful of geometric operations delegated to the
//! `image` crate.

use image::{DynamicImage, RgbImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Pixel data length {actual} does not match {width}x{height}x{channels} = {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },
}

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    Rgb,
    Rgba,
}

impl Channels {
    /// Number of bytes per pixel.
    pub fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Channels::Rgba)
    }
}

/// A rectangle in pixel coordinates, always inside the buffer it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Row-major 8-bit raster. Invariant: `data.len() == width * height * channels`
/// and both dimensions are non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                channels: channels.count(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A buffer with every pixel set to `pixel` (which must have `channels.count()` bytes).
    pub fn filled(
        width: u32,
        height: u32,
        channels: Channels,
        pixel: &[u8],
    ) -> Result<Self, BufferError> {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * channels.count());
        for _ in 0..count {
            data.extend_from_slice(&pixel[..channels.count()]);
        }
        Self::new(width, height, channels, data)
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(
        width: u32,
        height: u32,
        channels: Channels,
        mut f: F,
    ) -> Result<Self, BufferError>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let n = channels.count();
        let mut data = Vec::with_capacity(width as usize * height as usize * n);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y)[..n]);
            }
        }
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Memory footprint of the pixel data, used as the cache cost.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels.count()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }

    /// Channel bytes of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let i = self.offset(x, y);
        &self.data[i..i + self.channels.count()]
    }

    /// A buffer with this one's geometry holding `data`, which must have the
    /// same length as this buffer's pixel data.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> PixelBuffer {
        debug_assert_eq!(data.len(), self.data.len());
        PixelBuffer {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        }
    }

    /// Allocate a new buffer with the same geometry whose pixels are
    /// `f(source_pixel)` for RGB, alpha passed through untouched.
    pub fn map_rgb<F>(&self, f: F) -> PixelBuffer
    where
        F: Fn(u32, u32, [u8; 3]) -> [u8; 3],
    {
        let mut data = self.data.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.offset(x, y);
                let out = f(x, y, [data[i], data[i + 1], data[i + 2]]);
                data[i..i + 3].copy_from_slice(&out);
            }
        }
        self.with_data(data)
    }

    /// Copy the sub-rectangle `rect` into a new buffer.
    ///
    /// `rect` must lie inside the buffer; callers clamp first.
    pub fn extract(&self, rect: Rect) -> PixelBuffer {
        debug_assert!(rect.x + rect.width <= self.width && rect.y + rect.height <= self.height);
        let n = self.channels.count();
        let row_bytes = rect.width as usize * n;
        let mut data = Vec::with_capacity(row_bytes * rect.height as usize);
        for row in rect.y..rect.y + rect.height {
            let start = self.offset(rect.x, row);
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        PixelBuffer {
            width: rect.width,
            height: rect.height,
            channels: self.channels,
            data,
        }
    }

    /// Copy `tile` into this buffer with its top-left corner at `(x, y)`.
    /// Rows or columns falling outside the buffer are dropped.
    pub fn blit(&mut self, tile: &PixelBuffer, x: u32, y: u32) {
        debug_assert_eq!(tile.channels, self.channels);
        if x >= self.width || y >= self.height {
            return;
        }
        let n = self.channels.count();
        let copy_w = tile.width.min(self.width - x) as usize;
        let copy_h = tile.height.min(self.height - y);
        for row in 0..copy_h {
            let dst = self.offset(x, y + row);
            let src = tile.offset(0, row);
            self.data[dst..dst + copy_w * n].copy_from_slice(&tile.data[src..src + copy_w * n]);
        }
    }

    /// Wrap the pixel data as a `DynamicImage` without copying.
    pub fn into_dynamic_image(self) -> DynamicImage {
        let (w, h) = (self.width, self.height);
        match self.channels {
            Channels::Rgb => DynamicImage::ImageRgb8(
                RgbImage::from_raw(w, h, self.data).expect("length checked on construction"),
            ),
            Channels::Rgba => DynamicImage::ImageRgba8(
                RgbaImage::from_raw(w, h, self.data).expect("length checked on construction"),
            ),
        }
    }

    /// Convert a decoded image, keeping alpha when the source has it.
    pub fn from_dynamic_image(img: DynamicImage) -> Result<Self, BufferError> {
        if img.color().has_alpha() {
            Self::from_dynamic_image_as(img, Channels::Rgba)
        } else {
            Self::from_dynamic_image_as(img, Channels::Rgb)
        }
    }

    /// Convert a decoded image into the given channel layout.
    pub fn from_dynamic_image_as(
        img: DynamicImage,
        channels: Channels,
    ) -> Result<Self, BufferError> {
        let (w, h) = (img.width(), img.height());
        let data = match channels {
            Channels::Rgb => img.into_rgb8().into_raw(),
            Channels::Rgba => img.into_rgba8().into_raw(),
        };
        Self::new(w, h, channels, data)
    }
}
