//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its positional index and name; pixel dimensions
//! and progress are indented context below it. Batch output reads as a list
//! of the images processed, with tile progress nested under each.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! Grayscale: 6 tiles
//!     tile 001 (1/6, 17%)
//!     tile 004 (2/6, 33%)
//!     ...
//! Reassembling
//! Completed 600x300
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Pipeline: 2 steps
//! 001 Brightness
//!     → 600x300
//! 002 Rotate
//!     → 300x600
//! Completed 300x600
//! ```
//!
//! ## Batch
//!
//! ```text
//! Batch: 2 images
//! 001 beach.jpg
//!     tile 1/6 (10% overall)
//!     ...
//!     done (1/2)
//! 002 forest.png
//!     ...
//! Completed 2 images
//! ```
//!
//! ## Histogram
//!
//! ```text
//! Channel      Mean   Min   Max
//! Red         127.5     0   255
//! Green        64.0     0   128
//! Blue          5.0     0    10
//! Overall      65.5
//!
//! R  █       ▄
//! G  █   ▄
//! B  █
//! L  █   ▂   ▁
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the CLI prints it directly, a `print_*` wrapper.
//! Format functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, PipelineEvent};
use crate::buffer::PixelBuffer;
use crate::histogram::{HistogramData, HistogramStatistics};
use crate::tiling::ProgressEvent;
use std::time::Duration;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dimensions(buffer: &PixelBuffer) -> String {
    format!("{}x{}", buffer.width(), buffer.height())
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        ((done as f64 / total as f64) * 100.0).round() as usize
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Tiled apply
// ============================================================================

/// Format a single scheduler event. `label` names the filter being applied.
pub fn format_progress_event(label: &str, event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::Started => Vec::new(),
        ProgressEvent::TileDivided { count } => {
            vec![format!("{}: {}", label, plural(*count, "tile", "tiles"))]
        }
        ProgressEvent::TileCompleted {
            index,
            completed,
            total,
        } => vec![format!(
            "{}tile {} ({}/{}, {}%)",
            indent(1),
            format_index(index + 1),
            completed,
            total,
            percent(*completed, *total)
        )],
        ProgressEvent::Reassembling => vec!["Reassembling".to_string()],
        ProgressEvent::Completed { result } => {
            vec![format!("Completed {}", dimensions(result))]
        }
        ProgressEvent::Error { message } => vec![format!("Error: {}", message)],
        ProgressEvent::Cancelled => vec!["Cancelled".to_string()],
    }
}

// ============================================================================
// Pipeline
// ============================================================================

pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Started { total_steps } => {
            vec![format!("Pipeline: {}", plural(*total_steps, "step", "steps"))]
        }
        PipelineEvent::Processing { step, filter, .. } => {
            vec![format!("{} {}", format_index(*step), filter.display_name())]
        }
        PipelineEvent::StepCompleted { result, .. } => {
            vec![format!("{}→ {}", indent(1), dimensions(result))]
        }
        PipelineEvent::Completed { result } => {
            vec![format!("Completed {}", dimensions(result))]
        }
        PipelineEvent::Error { message } => vec![format!("Error: {}", message)],
        PipelineEvent::Cancelled => vec!["Cancelled".to_string()],
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch event. `names` labels each input image by position;
/// images without a name fall back to their index alone.
pub fn format_batch_event(event: &BatchEvent, names: &[String]) -> Vec<String> {
    let header = |index: usize| match names.get(index) {
        Some(name) => format!("{} {}", format_index(index + 1), name),
        None => format_index(index + 1),
    };
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Batch: {}", plural(*total, "image", "images"))]
        }
        BatchEvent::ImageStarted { index, .. } => vec![header(*index)],
        BatchEvent::TileCompleted {
            completed,
            total,
            overall_progress,
            ..
        } => vec![format!(
            "{}tile {}/{} ({:.0}% overall)",
            indent(1),
            completed,
            total,
            overall_progress * 100.0
        )],
        BatchEvent::ImageCompleted { completed, total } => {
            vec![format!("{}done ({}/{})", indent(1), completed, total)]
        }
        BatchEvent::Completed { results } => {
            vec![format!("Completed {}", plural(results.len(), "image", "images"))]
        }
        BatchEvent::Error { index, message } => {
            vec![format!("Error: {}: {}", header(*index), message)]
        }
        BatchEvent::Cancelled => vec!["Cancelled".to_string()],
    }
}

// ============================================================================
// Histogram
// ============================================================================

const SPARK: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 32;

/// Collapse 256 bins into `SPARK_WIDTH` buckets and draw them as block
/// characters, scaled against `peak`.
fn sparkline(bins: &[f32], peak: f32) -> String {
    let per_bucket = bins.len().div_ceil(SPARK_WIDTH).max(1);
    let buckets: Vec<f32> = bins.chunks(per_bucket).map(|c| c.iter().sum()).collect();
    let top = buckets.iter().copied().fold(0.0, f32::max).max(peak);
    buckets
        .iter()
        .map(|&v| {
            if top <= 0.0 {
                SPARK[0]
            } else {
                let level = ((v / top) * (SPARK.len() - 1) as f32).round() as usize;
                SPARK[level.min(SPARK.len() - 1)]
            }
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Format channel statistics and a compact plot of each histogram.
pub fn format_histogram(data: &HistogramData, stats: &HistogramStatistics) -> Vec<String> {
    let mut lines = vec![
        format!("{:<8}{:>9}{:>6}{:>6}", "Channel", "Mean", "Min", "Max"),
        format!(
            "{:<8}{:>9.1}{:>6}{:>6}",
            "Red", stats.mean_red, stats.min_red, stats.max_red
        ),
        format!(
            "{:<8}{:>9.1}{:>6}{:>6}",
            "Green", stats.mean_green, stats.min_green, stats.max_green
        ),
        format!(
            "{:<8}{:>9.1}{:>6}{:>6}",
            "Blue", stats.mean_blue, stats.min_blue, stats.max_blue
        ),
        format!("{:<8}{:>9.1}", "Overall", stats.overall_mean()),
        String::new(),
    ];

    // Bucketed bars share one scale so channels compare visually.
    let peak = [&data.red, &data.green, &data.blue, &data.luminance]
        .iter()
        .map(|bins| {
            let per_bucket = bins.len().div_ceil(SPARK_WIDTH).max(1);
            bins.chunks(per_bucket)
                .map(|c| c.iter().sum::<f32>())
                .fold(0.0, f32::max)
        })
        .fold(data.max_value(), f32::max);
    for (label, bins) in [
        ("R", &data.red),
        ("G", &data.green),
        ("B", &data.blue),
        ("L", &data.luminance),
    ] {
        lines.push(format!("{}  {}", label, sparkline(bins, peak)).trim_end().to_string());
    }
    lines
}

pub fn print_histogram(data: &HistogramData, stats: &HistogramStatistics) {
    for line in format_histogram(data, stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Estimates
// ============================================================================

pub fn format_estimate(label: &str, estimate: Duration) -> String {
    let ms = estimate.as_millis();
    if ms < 1000 {
        format!("{}: ~{} ms", label, ms)
    } else {
        format!("{}: ~{:.1} s", label, estimate.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use crate::histogram::{compute_histogram, compute_statistics};
    use crate::imaging::FilterSpec;
    use std::sync::Arc;

    fn buffer(w: u32, h: u32) -> Arc<PixelBuffer> {
        Arc::new(PixelBuffer::filled(w, h, Channels::Rgb, &[0, 0, 0]).unwrap())
    }

    #[test]
    fn format_index_triple_digit() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(1, 6), 17);
        assert_eq!(percent(6, 6), 100);
        assert_eq!(percent(0, 0), 100);
    }

    // =========================================================================
    // Progress event formatting tests
    // =========================================================================

    #[test]
    fn format_progress_tile_divided() {
        let lines = format_progress_event("Grayscale", &ProgressEvent::TileDivided { count: 6 });
        assert_eq!(lines, vec!["Grayscale: 6 tiles"]);
        let lines = format_progress_event("Rotate", &ProgressEvent::TileDivided { count: 1 });
        assert_eq!(lines, vec!["Rotate: 1 tile"]);
    }

    #[test]
    fn format_progress_tile_completed() {
        let event = ProgressEvent::TileCompleted {
            index: 3,
            completed: 2,
            total: 6,
        };
        assert_eq!(
            format_progress_event("Blur", &event),
            vec!["    tile 004 (2/6, 33%)"]
        );
    }

    #[test]
    fn format_progress_started_is_silent() {
        assert!(format_progress_event("Sepia", &ProgressEvent::Started).is_empty());
    }

    #[test]
    fn format_progress_terminal_events() {
        let done = ProgressEvent::Completed {
            result: buffer(600, 300),
        };
        assert_eq!(format_progress_event("x", &done), vec!["Completed 600x300"]);
        let err = ProgressEvent::Error {
            message: "tile 2 failed: boom".into(),
        };
        assert_eq!(
            format_progress_event("x", &err),
            vec!["Error: tile 2 failed: boom"]
        );
        assert_eq!(
            format_progress_event("x", &ProgressEvent::Cancelled),
            vec!["Cancelled"]
        );
    }

    // =========================================================================
    // Pipeline / batch formatting tests
    // =========================================================================

    #[test]
    fn format_pipeline_steps() {
        assert_eq!(
            format_pipeline_event(&PipelineEvent::Started { total_steps: 2 }),
            vec!["Pipeline: 2 steps"]
        );
        let processing = PipelineEvent::Processing {
            step: 2,
            total: 2,
            filter: FilterSpec::Rotate(90),
        };
        assert_eq!(format_pipeline_event(&processing), vec!["002 Rotate"]);
        let done = PipelineEvent::StepCompleted {
            step: 2,
            total: 2,
            filter: FilterSpec::Rotate(90),
            result: buffer(300, 600),
        };
        assert_eq!(format_pipeline_event(&done), vec!["    → 300x600"]);
    }

    #[test]
    fn format_batch_uses_names() {
        let names = vec!["beach.jpg".to_string(), "forest.png".to_string()];
        assert_eq!(
            format_batch_event(&BatchEvent::Started { total: 2 }, &names),
            vec!["Batch: 2 images"]
        );
        assert_eq!(
            format_batch_event(&BatchEvent::ImageStarted { index: 1, total: 2 }, &names),
            vec!["002 forest.png"]
        );
        let tile = BatchEvent::TileCompleted {
            image: 0,
            completed: 1,
            total: 6,
            overall_progress: 0.1,
        };
        assert_eq!(
            format_batch_event(&tile, &names),
            vec!["    tile 1/6 (10% overall)"]
        );
        let err = BatchEvent::Error {
            index: 0,
            message: "boom".into(),
        };
        assert_eq!(
            format_batch_event(&err, &names),
            vec!["Error: 001 beach.jpg: boom"]
        );
    }

    #[test]
    fn format_batch_without_names() {
        let event = BatchEvent::ImageStarted { index: 4, total: 9 };
        assert_eq!(format_batch_event(&event, &[]), vec!["005"]);
    }

    #[test]
    fn format_batch_completed() {
        let event = BatchEvent::Completed {
            results: vec![buffer(2, 2)],
        };
        assert_eq!(format_batch_event(&event, &[]), vec!["Completed 1 image"]);
    }

    // =========================================================================
    // Histogram / estimate formatting tests
    // =========================================================================

    #[test]
    fn format_histogram_table() {
        let buf = PixelBuffer::from_fn(4, 2, Channels::Rgb, |x, _| {
            if x < 2 { [0, 0, 0, 0] } else { [255, 128, 10, 0] }
        })
        .unwrap();
        let lines = format_histogram(&compute_histogram(&buf), &compute_statistics(&buf));
        assert_eq!(lines[0], "Channel      Mean   Min   Max");
        assert_eq!(lines[1], "Red         127.5     0   255");
        assert_eq!(lines[2], "Green        64.0     0   128");
        assert_eq!(lines[3], "Blue          5.0     0    10");
        assert_eq!(lines[4], "Overall      65.5");
        assert_eq!(lines.len(), 10);
        assert!(lines[6].starts_with("R  █"));
    }

    #[test]
    fn sparkline_of_empty_bins_is_blank() {
        assert_eq!(sparkline(&[0.0; 256], 0.0), "");
    }

    #[test]
    fn format_estimate_units() {
        assert_eq!(
            format_estimate("Blur", Duration::from_millis(340)),
            "Blur: ~340 ms"
        );
        assert_eq!(
            format_estimate("Blur", Duration::from_millis(2500)),
            "Blur: ~2.5 s"
        );
    }
}
