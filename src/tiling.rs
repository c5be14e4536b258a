//! Tile-parallel filter application.
//!
//! The [`TileScheduler`] splits a source buffer into a grid of tiles, filters
//! every tile on a bounded worker pool and stitches the results back together:
//!
//! ```text
//! Started → TileDivided(N) → TileCompleted × N → Reassembling → Completed
//!                    ╰──────────── Error | Cancelled ───────────╯
//! ```
//!
//! ## Admission
//!
//! Each scheduler owns a rayon pool with exactly `max_concurrency` threads.
//! That pool is the admission gate: no matter how many tiles there are, at
//! most `max_concurrency` filter calls run at once. Tiles are independent;
//! the only shared state is the read-only source, a completion counter and
//! the cancel flag.
//!
//! ## Failure and cancellation
//!
//! A failing or panicking tile aborts the whole run (`collect` into `Result`
//! stops handing out work) and no partial image is assembled. Cancellation is
//! cooperative: every tile checks the [`CancelToken`] before it starts, tiles
//! already running finish, and the run resolves to [`TileOutcome::Cancelled`].
//!
//! ## Seams
//!
//! Blur, sharpen and edge detection read neighbouring pixels. Under
//! [`SeamPolicy::Clamp`] each tile is filtered on its own, so tile edges are
//! treated as image edges and seams can appear. [`SeamPolicy::Halo`] extracts
//! each tile with a border of [`FilterSpec::halo`] pixels, filters that, and
//! crops the border away, which reproduces whole-image output exactly.
//!
//! Filters that change geometry (and vignette, which depends on the image
//! centre) are dispatched as one whole-image tile.

use crate::buffer::{PixelBuffer, Rect};
use crate::config::TilingConfig;
use crate::imaging::calculations::{expand_rect, tile_grid};
use crate::imaging::{FilterBackend, FilterError, FilterSpec, RustBackend};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum TileError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("Tile {index} failed: {message}")]
    TileFailure { index: usize, message: String },
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// How neighbourhood filters treat tile boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeamPolicy {
    /// Filter each tile in isolation. Matches historical output.
    #[default]
    Clamp,
    /// Pad each tile with neighbouring pixels so output matches whole-image
    /// application.
    Halo,
}

/// Progress of one scheduler run, in emission order.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started,
    TileDivided {
        count: usize,
    },
    /// `index` is the tile's position in the grid; events arrive in
    /// completion order, not index order.
    TileCompleted {
        index: usize,
        completed: usize,
        total: usize,
    },
    Reassembling,
    Completed {
        result: Arc<PixelBuffer>,
    },
    Error {
        message: String,
    },
    Cancelled,
}

impl ProgressEvent {
    /// Fraction of tiles done, for `TileCompleted` events.
    pub fn fraction(&self) -> Option<f32> {
        match self {
            ProgressEvent::TileCompleted {
                completed, total, ..
            } => Some(*completed as f32 / *total as f32),
            _ => None,
        }
    }
}

/// Terminal state of a successful run.
#[derive(Debug, Clone)]
pub enum TileOutcome {
    Completed(Arc<PixelBuffer>),
    Cancelled,
}

impl TileOutcome {
    pub fn completed(self) -> Option<Arc<PixelBuffer>> {
        match self {
            TileOutcome::Completed(buf) => Some(buf),
            TileOutcome::Cancelled => None,
        }
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A tile in flight: where it came from and the filtered pixels.
#[derive(Debug)]
pub struct Tile {
    pub index: usize,
    pub rect: Rect,
    pub buffer: PixelBuffer,
}

pub(crate) fn emit<E>(events: &Option<Sender<E>>, event: E) {
    if let Some(tx) = events {
        // A consumer that hung up only loses progress, never results.
        let _ = tx.send(event);
    }
}

pub struct TileScheduler {
    config: TilingConfig,
    pool: rayon::ThreadPool,
}

impl TileScheduler {
    pub fn new(config: TilingConfig) -> Result<Self, TileError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency.max(1))
            .thread_name(|i| format!("tessera-tile-{i}"))
            .build()?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Tiles a run over `source` would use for `spec`.
    pub fn partition(&self, dims: (u32, u32), spec: &FilterSpec) -> Vec<Rect> {
        if spec.is_tileable() {
            tile_grid(dims, self.config.tile_size.max(1))
        } else {
            vec![Rect::new(0, 0, dims.0, dims.1)]
        }
    }

    pub fn run(
        &self,
        source: &PixelBuffer,
        spec: &FilterSpec,
        cancel: &CancelToken,
        events: Option<Sender<ProgressEvent>>,
    ) -> Result<TileOutcome, TileError> {
        self.run_with_backend(&RustBackend::new(), source, spec, cancel, events)
    }

    /// Run with a specific backend (allows testing with mock).
    pub fn run_with_backend(
        &self,
        backend: &impl FilterBackend,
        source: &PixelBuffer,
        spec: &FilterSpec,
        cancel: &CancelToken,
        events: Option<Sender<ProgressEvent>>,
    ) -> Result<TileOutcome, TileError> {
        emit(&events, ProgressEvent::Started);

        if let Err(e) = spec.validate() {
            emit(&events, ProgressEvent::Error { message: e.to_string() });
            return Err(e.into());
        }
        if cancel.is_cancelled() {
            emit(&events, ProgressEvent::Cancelled);
            return Ok(TileOutcome::Cancelled);
        }

        let rects = self.partition(source.dimensions(), spec);
        let total = rects.len();
        let halo = match self.config.seam_policy {
            SeamPolicy::Halo => spec.halo(),
            SeamPolicy::Clamp => 0,
        };
        debug!(
            filter = spec.kind_name(),
            width = source.width(),
            height = source.height(),
            tiles = total,
            halo,
            "dividing image"
        );
        emit(&events, ProgressEvent::TileDivided { count: total });

        let completed = AtomicUsize::new(0);
        let results: Result<Vec<Option<Tile>>, TileError> = self.pool.install(|| {
            rects
                .par_iter()
                .enumerate()
                .map(|(index, &rect)| {
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    let buffer = filter_tile(backend, source, spec, index, rect, halo)?;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    trace!(index, done, total, "tile completed");
                    emit(
                        &events,
                        ProgressEvent::TileCompleted {
                            index,
                            completed: done,
                            total,
                        },
                    );
                    Ok(Some(Tile {
                        index,
                        rect,
                        buffer,
                    }))
                })
                .collect()
        });

        let tiles = match results {
            Ok(tiles) => tiles,
            Err(e) => {
                debug!(error = %e, "tile run aborted");
                emit(&events, ProgressEvent::Error { message: e.to_string() });
                return Err(e);
            }
        };

        if cancel.is_cancelled() || tiles.iter().any(Option::is_none) {
            debug!(
                completed = completed.load(Ordering::SeqCst),
                total, "tile run cancelled"
            );
            emit(&events, ProgressEvent::Cancelled);
            return Ok(TileOutcome::Cancelled);
        }

        emit(&events, ProgressEvent::Reassembling);
        let result = Arc::new(reassemble(source, spec, tiles.into_iter().flatten()));
        emit(
            &events,
            ProgressEvent::Completed {
                result: Arc::clone(&result),
            },
        );
        Ok(TileOutcome::Completed(result))
    }
}

/// Extract, filter and (under the halo policy) trim one tile.
fn filter_tile(
    backend: &impl FilterBackend,
    source: &PixelBuffer,
    spec: &FilterSpec,
    index: usize,
    rect: Rect,
    halo: u32,
) -> Result<PixelBuffer, TileError> {
    let (outer, inner) = expand_rect(rect, halo, source.dimensions());
    let whole = outer == Rect::new(0, 0, source.width(), source.height());
    let extracted;
    let input = if whole {
        source
    } else {
        extracted = source.extract(outer);
        &extracted
    };

    let filtered = match panic::catch_unwind(AssertUnwindSafe(|| backend.apply(input, spec))) {
        Ok(Ok(buf)) => buf,
        Ok(Err(e)) => {
            return Err(TileError::TileFailure {
                index,
                message: e.to_string(),
            });
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "filter panicked".to_string());
            return Err(TileError::TileFailure { index, message });
        }
    };

    if inner == Rect::new(0, 0, outer.width, outer.height) {
        Ok(filtered)
    } else {
        Ok(filtered.extract(inner))
    }
}

fn reassemble(
    source: &PixelBuffer,
    spec: &FilterSpec,
    mut tiles: impl Iterator<Item = Tile>,
) -> PixelBuffer {
    if !spec.is_tileable() {
        // Whole-image tile; its geometry may differ from the source.
        if let Some(tile) = tiles.next() {
            return tile.buffer;
        }
    }
    let mut out = source.with_data(vec![0; source.byte_size()]);
    for tile in tiles {
        out.blit(&tile.buffer, tile.rect.x, tile.rect.y);
    }
    out
}
