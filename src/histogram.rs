//! Channel histograms and summary statistics.
//!
//! Both computations are a single read-only scan of the buffer. Alpha is
//! ignored.
//!
//! The luminance histogram is *derived* from the three channel histograms,
//! bin by bin, as `0.299·R[i] + 0.587·G[i] + 0.114·B[i]`. It is not a
//! histogram of per-pixel luminance; front ends draw it as an approximation
//! and rely on it matching earlier releases.

use crate::buffer::PixelBuffer;
use serde::Serialize;

pub const HISTOGRAM_BINS: usize = 256;

/// Normalised per-channel histograms: each bin is `count / total_pixels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramData {
    pub red: Vec<f32>,
    pub green: Vec<f32>,
    pub blue: Vec<f32>,
    pub luminance: Vec<f32>,
}

impl HistogramData {
    /// Tallest bin across the three color channels, for scaling a plot.
    pub fn max_value(&self) -> f32 {
        self.red
            .iter()
            .chain(&self.green)
            .chain(&self.blue)
            .copied()
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramStatistics {
    pub mean_red: f32,
    pub mean_green: f32,
    pub mean_blue: f32,
    pub min_red: u8,
    pub max_red: u8,
    pub min_green: u8,
    pub max_green: u8,
    pub min_blue: u8,
    pub max_blue: u8,
}

impl HistogramStatistics {
    pub fn overall_mean(&self) -> f32 {
        (self.mean_red + self.mean_green + self.mean_blue) / 3.0
    }
}

pub fn compute_histogram(buffer: &PixelBuffer) -> HistogramData {
    let n = buffer.channels().count();
    let mut counts = [[0u64; HISTOGRAM_BINS]; 3];
    for px in buffer.data().chunks_exact(n) {
        counts[0][px[0] as usize] += 1;
        counts[1][px[1] as usize] += 1;
        counts[2][px[2] as usize] += 1;
    }

    let total = buffer.pixel_count() as f32;
    let normalise = |c: &[u64; HISTOGRAM_BINS]| -> Vec<f32> {
        c.iter().map(|&v| v as f32 / total).collect()
    };
    let red = normalise(&counts[0]);
    let green = normalise(&counts[1]);
    let blue = normalise(&counts[2]);
    let luminance = (0..HISTOGRAM_BINS)
        .map(|i| red[i] * 0.299 + green[i] * 0.587 + blue[i] * 0.114)
        .collect();

    HistogramData {
        red,
        green,
        blue,
        luminance,
    }
}

pub fn compute_statistics(buffer: &PixelBuffer) -> HistogramStatistics {
    let n = buffer.channels().count();
    let mut sum = [0u64; 3];
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    for px in buffer.data().chunks_exact(n) {
        for c in 0..3 {
            sum[c] += px[c] as u64;
            min[c] = min[c].min(px[c]);
            max[c] = max[c].max(px[c]);
        }
    }

    let total = buffer.pixel_count() as f64;
    let mean = |c: usize| (sum[c] as f64 / total) as f32;
    HistogramStatistics {
        mean_red: mean(0),
        mean_green: mean(1),
        mean_blue: mean(2),
        min_red: min[0],
        max_red: max[0],
        min_green: min[1],
        max_green: max[1],
        min_blue: min[2],
        max_blue: max[2],
    }
}
