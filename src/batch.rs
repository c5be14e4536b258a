//! Multi-step and multi-image runs.
//!
//! [`BatchCoordinator`] sequences work on top of a [`FilterEngine`]:
//!
//! | Operation | Unit of work | Cached | Events |
//! |---|---|---|---|
//! | [`pipeline`](BatchCoordinator::pipeline) | several filters, one image | yes | [`PipelineEvent`] |
//! | [`batch`](BatchCoordinator::batch) | one filter, many images | no | [`BatchEvent`] |
//! | [`batch_each`](BatchCoordinator::batch_each) | one filter per image | no | [`BatchEvent`] |
//! | [`batch_images`](BatchCoordinator::batch_images) | one filter, many [`ImageData`] | no | [`BatchEvent`] |
//!
//! Batches run images one after another; each image is tiled across the
//! scheduler's pool. All runs are fail-fast: the first error stops the run
//! and no partial result list is returned.
//!
//! Time estimates come from a fixed per-tile cost table. They drive UI
//! hints only and are not measured.

use crate::buffer::PixelBuffer;
use crate::engine::{FilterEngine, ImageData};
use crate::imaging::calculations::tile_count;
use crate::imaging::{FilterBackend, FilterError, FilterSpec, MAX_BLUR_RADIUS, RustBackend};
use crate::tiling::{CancelToken, ProgressEvent, TileError, TileOutcome, emit};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Fixed cost added to every estimate for decode, reassembly and handoff.
pub const ESTIMATE_OVERHEAD: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("image {image}: {source}")]
    Tile {
        image: usize,
        #[source]
        source: TileError,
    },
    #[error("image {index} ({id}) has no pixel data")]
    SourceUnavailable { index: usize, id: String },
}

/// Progress of a pipeline run. Steps are numbered from 1.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started {
        total_steps: usize,
    },
    Processing {
        step: usize,
        total: usize,
        filter: FilterSpec,
    },
    StepCompleted {
        step: usize,
        total: usize,
        filter: FilterSpec,
        result: Arc<PixelBuffer>,
    },
    Completed {
        result: Arc<PixelBuffer>,
    },
    Error {
        message: String,
    },
    Cancelled,
}

/// Progress of a batch run. Image indices are 0-based positions in the input.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    ImageStarted {
        index: usize,
        total: usize,
    },
    /// `completed`/`total` count tiles of this image; `overall_progress` is
    /// tiles done across the whole batch over all tiles in the batch.
    TileCompleted {
        image: usize,
        completed: usize,
        total: usize,
        overall_progress: f32,
    },
    ImageCompleted {
        completed: usize,
        total: usize,
    },
    Completed {
        results: Vec<Arc<PixelBuffer>>,
    },
    Error {
        index: usize,
        message: String,
    },
    Cancelled,
}

/// Terminal state of a successful batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome<T = Arc<PixelBuffer>> {
    /// One result per input, in input order.
    Completed(Vec<T>),
    Cancelled,
}

impl<T> BatchOutcome<T> {
    pub fn completed(self) -> Option<Vec<T>> {
        match self {
            BatchOutcome::Completed(results) => Some(results),
            BatchOutcome::Cancelled => None,
        }
    }
}

/// Estimated time to filter one tile.
pub fn per_tile_cost(spec: &FilterSpec) -> Duration {
    let ms = match *spec {
        FilterSpec::Grayscale => 10,
        FilterSpec::Sepia => 15,
        FilterSpec::Negative => 10,
        FilterSpec::Brightness(_) => 12,
        FilterSpec::Contrast(_) => 15,
        FilterSpec::Saturation(_) => 15,
        FilterSpec::Blur(radius) => 20 * u64::from(radius.min(MAX_BLUR_RADIUS)),
        FilterSpec::Sharpen => 25,
        FilterSpec::EdgeDetection => 30,
        FilterSpec::Posterize(_) => 20,
        FilterSpec::Vignette(_) => 18,
        FilterSpec::Rotate(_) => 5,
        FilterSpec::Flip { .. } => 5,
        FilterSpec::Crop(_) => 3,
        FilterSpec::Resize(_) => 8,
    };
    Duration::from_millis(ms)
}

pub struct BatchCoordinator<'e, B: FilterBackend = RustBackend> {
    engine: &'e FilterEngine<B>,
}

impl<'e, B: FilterBackend> BatchCoordinator<'e, B> {
    pub fn new(engine: &'e FilterEngine<B>) -> Self {
        Self { engine }
    }

    /// Apply `filters` in order, each to the previous step's result.
    ///
    /// An empty pipeline completes immediately with `source`. Cancellation is
    /// checked between steps.
    pub fn pipeline(
        &self,
        source: &Arc<PixelBuffer>,
        filters: &[FilterSpec],
        cancel: &CancelToken,
        events: Option<Sender<PipelineEvent>>,
    ) -> Result<TileOutcome, FilterError> {
        if filters.is_empty() {
            emit(
                &events,
                PipelineEvent::Completed {
                    result: Arc::clone(source),
                },
            );
            return Ok(TileOutcome::Completed(Arc::clone(source)));
        }

        let total = filters.len();
        emit(&events, PipelineEvent::Started { total_steps: total });

        let mut current = Arc::clone(source);
        for (i, spec) in filters.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(step = i + 1, total, "pipeline cancelled");
                emit(&events, PipelineEvent::Cancelled);
                return Ok(TileOutcome::Cancelled);
            }

            let step = i + 1;
            emit(
                &events,
                PipelineEvent::Processing {
                    step,
                    total,
                    filter: *spec,
                },
            );
            current = match self.engine.apply(&current, spec) {
                Ok(result) => result,
                Err(e) => {
                    emit(&events, PipelineEvent::Error { message: e.to_string() });
                    return Err(e);
                }
            };
            emit(
                &events,
                PipelineEvent::StepCompleted {
                    step,
                    total,
                    filter: *spec,
                    result: Arc::clone(&current),
                },
            );
        }

        if cancel.is_cancelled() {
            debug!(total, "pipeline cancelled during last step");
            emit(&events, PipelineEvent::Cancelled);
            return Ok(TileOutcome::Cancelled);
        }
        emit(
            &events,
            PipelineEvent::Completed {
                result: Arc::clone(&current),
            },
        );
        Ok(TileOutcome::Completed(current))
    }

    /// Apply the same filter to every source.
    pub fn batch(
        &self,
        sources: &[Arc<PixelBuffer>],
        spec: &FilterSpec,
        cancel: &CancelToken,
        events: Option<Sender<BatchEvent>>,
    ) -> Result<BatchOutcome, BatchError> {
        let jobs: Vec<_> = sources.iter().map(|s| (Arc::clone(s), *spec)).collect();
        self.batch_each(&jobs, cancel, events)
    }

    /// Apply each job's own filter to its source.
    pub fn batch_each(
        &self,
        jobs: &[(Arc<PixelBuffer>, FilterSpec)],
        cancel: &CancelToken,
        events: Option<Sender<BatchEvent>>,
    ) -> Result<BatchOutcome, BatchError> {
        let total = jobs.len();
        if total == 0 {
            emit(&events, BatchEvent::Completed { results: Vec::new() });
            return Ok(BatchOutcome::Completed(Vec::new()));
        }

        // Reject bad parameters before any pixel work.
        for (index, (_, spec)) in jobs.iter().enumerate() {
            if let Err(e) = spec.validate() {
                emit(
                    &events,
                    BatchEvent::Error {
                        index,
                        message: e.to_string(),
                    },
                );
                return Err(e.into());
            }
        }

        let scheduler = self.engine.scheduler();
        let tile_counts: Vec<usize> = jobs
            .iter()
            .map(|(source, spec)| scheduler.partition(source.dimensions(), spec).len())
            .collect();
        let all_tiles: usize = tile_counts.iter().sum();
        info!(images = total, tiles = all_tiles, "starting batch");
        emit(&events, BatchEvent::Started { total });

        let mut tiles_done = 0;
        let mut results = Vec::with_capacity(total);
        for (index, (source, spec)) in jobs.iter().enumerate() {
            if cancel.is_cancelled() {
                emit(&events, BatchEvent::Cancelled);
                return Ok(BatchOutcome::Cancelled);
            }
            emit(&events, BatchEvent::ImageStarted { index, total });

            let (tx, rx) = mpsc::channel();
            let outcome = thread::scope(|s| {
                let events = &events;
                let base = tiles_done;
                // Relabel this image's tile events for the batch consumer.
                s.spawn(move || {
                    for event in rx {
                        if let ProgressEvent::TileCompleted {
                            completed, total, ..
                        } = event
                        {
                            emit(
                                events,
                                BatchEvent::TileCompleted {
                                    image: index,
                                    completed,
                                    total,
                                    overall_progress: (base + completed) as f32
                                        / all_tiles as f32,
                                },
                            );
                        }
                    }
                });
                scheduler.run_with_backend(self.engine.backend(), source, spec, cancel, Some(tx))
            });

            match outcome {
                Ok(TileOutcome::Completed(result)) => {
                    tiles_done += tile_counts[index];
                    results.push(result);
                    emit(
                        &events,
                        BatchEvent::ImageCompleted {
                            completed: index + 1,
                            total,
                        },
                    );
                }
                Ok(TileOutcome::Cancelled) => {
                    debug!(image = index, "batch cancelled");
                    emit(&events, BatchEvent::Cancelled);
                    return Ok(BatchOutcome::Cancelled);
                }
                Err(e) => {
                    emit(
                        &events,
                        BatchEvent::Error {
                            index,
                            message: e.to_string(),
                        },
                    );
                    return Err(BatchError::Tile {
                        image: index,
                        source: e,
                    });
                }
            }
        }

        emit(
            &events,
            BatchEvent::Completed {
                results: results.clone(),
            },
        );
        Ok(BatchOutcome::Completed(results))
    }

    /// Batch over image records, returning updated records with `spec`
    /// appended to their filter history.
    pub fn batch_images(
        &self,
        images: &[ImageData],
        spec: &FilterSpec,
        cancel: &CancelToken,
        events: Option<Sender<BatchEvent>>,
    ) -> Result<BatchOutcome<ImageData>, BatchError> {
        let mut sources = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match &image.buffer {
                Some(buffer) => sources.push(Arc::clone(buffer)),
                None => {
                    let err = BatchError::SourceUnavailable {
                        index,
                        id: image.id.clone(),
                    };
                    emit(
                        &events,
                        BatchEvent::Error {
                            index,
                            message: err.to_string(),
                        },
                    );
                    return Err(err);
                }
            }
        }

        let results = match self.batch(&sources, spec, cancel, events)? {
            BatchOutcome::Completed(results) => results,
            BatchOutcome::Cancelled => return Ok(BatchOutcome::Cancelled),
        };
        let updated = images
            .iter()
            .zip(results)
            .map(|(image, result)| {
                let mut applied_filters = image.applied_filters.clone();
                applied_filters.push(*spec);
                ImageData {
                    buffer: Some(result),
                    applied_filters,
                    ..image.clone()
                }
            })
            .collect();
        Ok(BatchOutcome::Completed(updated))
    }

    /// Estimated wall time to filter one image of `dims`.
    pub fn estimate(&self, dims: (u32, u32), spec: &FilterSpec) -> Duration {
        let config = self.engine.scheduler().config();
        let tiles = tile_count(dims, config.tile_size.max(1));
        let rounds = tiles.div_ceil(config.max_concurrency.max(1));
        per_tile_cost(spec) * rounds as u32 + ESTIMATE_OVERHEAD
    }

    /// Sum of [`estimate`](Self::estimate) over every image.
    pub fn estimate_batch(&self, dims: &[(u32, u32)], spec: &FilterSpec) -> Duration {
        dims.iter().map(|&d| self.estimate(d, spec)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use crate::config::{EngineConfig, TilingConfig};
    use crate::imaging::CropRect;
    use crate::imaging::backend::tests::MockBackend;
    use crate::tiling::SeamPolicy;

    fn gradient(w: u32, h: u32) -> Arc<PixelBuffer> {
        Arc::new(
            PixelBuffer::from_fn(w, h, Channels::Rgb, |x, y| {
                [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 0]
            })
            .unwrap(),
        )
    }

    fn config(tile_size: u32, max_concurrency: usize) -> EngineConfig {
        EngineConfig {
            tiling: TilingConfig {
                tile_size,
                max_concurrency,
                seam_policy: SeamPolicy::Clamp,
            },
            ..EngineConfig::default()
        }
    }

    fn engine_with<B: FilterBackend>(backend: B, max_concurrency: usize) -> FilterEngine<B> {
        FilterEngine::with_backend(&config(256, max_concurrency), backend).unwrap()
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[test]
    fn empty_pipeline_completes_with_source() {
        let engine = engine_with(MockBackend::new(), 2);
        let src = gradient(8, 8);
        let (tx, rx) = mpsc::channel();
        let outcome = BatchCoordinator::new(&engine)
            .pipeline(&src, &[], &CancelToken::new(), Some(tx))
            .unwrap();

        let result = outcome.completed().unwrap();
        assert!(Arc::ptr_eq(&result, &src));
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Completed { .. }));
        assert_eq!(engine.backend().call_count(), 0);
    }

    #[test]
    fn pipeline_applies_steps_in_order() {
        let engine = engine_with(RustBackend::new(), 2);
        let src = gradient(40, 30);
        let filters = [
            FilterSpec::Brightness(20.0),
            FilterSpec::Rotate(90),
            FilterSpec::Negative,
        ];
        let (tx, rx) = mpsc::channel();
        let result = BatchCoordinator::new(&engine)
            .pipeline(&src, &filters, &CancelToken::new(), Some(tx))
            .unwrap()
            .completed()
            .unwrap();

        let backend = RustBackend::new();
        let mut expected = (*src).clone();
        for spec in &filters {
            expected = backend.apply(&expected, spec).unwrap();
        }
        assert_eq!(*result, expected);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 8);
        assert!(matches!(events[0], PipelineEvent::Started { total_steps: 3 }));
        assert!(matches!(
            events[1],
            PipelineEvent::Processing {
                step: 1,
                total: 3,
                filter: FilterSpec::Brightness(_)
            }
        ));
        assert!(matches!(
            events[6],
            PipelineEvent::StepCompleted { step: 3, total: 3, .. }
        ));
        assert!(matches!(events[7], PipelineEvent::Completed { .. }));
    }

    #[test]
    fn pipeline_stops_at_first_failure() {
        let engine = engine_with(MockBackend::failing_on(2), 2);
        let filters = [FilterSpec::Negative, FilterSpec::Sepia, FilterSpec::Grayscale];
        let (tx, rx) = mpsc::channel();
        let result = BatchCoordinator::new(&engine).pipeline(
            &gradient(8, 8),
            &filters,
            &CancelToken::new(),
            Some(tx),
        );

        assert!(result.is_err());
        assert_eq!(engine.backend().call_count(), 2);
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Error { .. })));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, PipelineEvent::StepCompleted { step: 2, .. }))
        );
    }

    #[test]
    fn pipeline_cancel_between_steps() {
        let cancel = CancelToken::new();
        let hook_cancel = cancel.clone();
        let engine = engine_with(MockBackend::with_hook(move |_| hook_cancel.cancel()), 2);
        let filters = [FilterSpec::Negative, FilterSpec::Sepia];
        let (tx, rx) = mpsc::channel();
        let outcome = BatchCoordinator::new(&engine)
            .pipeline(&gradient(8, 8), &filters, &cancel, Some(tx))
            .unwrap();

        assert!(matches!(outcome, TileOutcome::Cancelled));
        assert_eq!(engine.backend().call_count(), 1);
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Cancelled)));
    }

    #[test]
    fn pipeline_cancelled_during_last_step_is_not_completed() {
        let cancel = CancelToken::new();
        let hook_cancel = cancel.clone();
        let engine = engine_with(MockBackend::with_hook(move |_| hook_cancel.cancel()), 2);
        let (tx, rx) = mpsc::channel();
        let outcome = BatchCoordinator::new(&engine)
            .pipeline(&gradient(8, 8), &[FilterSpec::Negative], &cancel, Some(tx))
            .unwrap();

        assert!(matches!(outcome, TileOutcome::Cancelled));
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Cancelled)));
        assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Completed { .. })));
    }

    // =========================================================================
    // Batch
    // =========================================================================

    #[test]
    fn batch_reports_every_tile_and_keeps_input_order() {
        let engine = engine_with(RustBackend::new(), 2);
        // 3x2 + 1x1 + 3x1 tiles at 256.
        let sources = vec![gradient(600, 300), gradient(256, 256), gradient(513, 100)];
        let (tx, rx) = mpsc::channel();
        let results = BatchCoordinator::new(&engine)
            .batch(&sources, &FilterSpec::Grayscale, &CancelToken::new(), Some(tx))
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(results.len(), 3);
        for (src, out) in sources.iter().zip(&results) {
            assert_eq!(
                **out,
                RustBackend::new().apply(src, &FilterSpec::Grayscale).unwrap()
            );
        }

        let events: Vec<_> = rx.iter().collect();
        let tiles = events
            .iter()
            .filter(|e| matches!(e, BatchEvent::TileCompleted { .. }))
            .count();
        assert_eq!(tiles, 6 + 1 + 3);
        let peak = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::TileCompleted {
                    overall_progress, ..
                } => Some(*overall_progress),
                _ => None,
            })
            .fold(0.0, f32::max);
        assert!((peak - 1.0).abs() < 1e-6);
        assert!(matches!(events[0], BatchEvent::Started { total: 3 }));
        match events.last() {
            Some(BatchEvent::Completed { results }) => assert_eq!(results.len(), 3),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn empty_batch_completes_immediately() {
        let engine = engine_with(MockBackend::new(), 2);
        let (tx, rx) = mpsc::channel();
        let outcome = BatchCoordinator::new(&engine)
            .batch(&[], &FilterSpec::Sepia, &CancelToken::new(), Some(tx))
            .unwrap();

        assert!(outcome.completed().unwrap().is_empty());
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], BatchEvent::Completed { results } if results.is_empty()));
    }

    #[test]
    fn batch_each_uses_per_image_filters() {
        let engine = engine_with(RustBackend::new(), 2);
        let jobs = vec![
            (gradient(40, 20), FilterSpec::Negative),
            (gradient(40, 20), FilterSpec::Rotate(90)),
        ];
        let results = BatchCoordinator::new(&engine)
            .batch_each(&jobs, &CancelToken::new(), None)
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(results[0].dimensions(), (40, 20));
        assert_eq!(results[1].dimensions(), (20, 40));
    }

    #[test]
    fn batch_fails_fast_on_tile_error() {
        let engine = engine_with(MockBackend::failing_on(2), 1);
        let sources = vec![gradient(64, 64), gradient(64, 64), gradient(64, 64)];
        let (tx, rx) = mpsc::channel();
        let err = BatchCoordinator::new(&engine)
            .batch(&sources, &FilterSpec::Sepia, &CancelToken::new(), Some(tx))
            .unwrap_err();

        assert!(matches!(err, BatchError::Tile { image: 1, .. }));
        assert_eq!(engine.backend().call_count(), 2);
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events.last(), Some(BatchEvent::Error { index: 1, .. })));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, BatchEvent::ImageStarted { index: 2, .. }))
        );
    }

    #[test]
    fn batch_rejects_invalid_filter_before_work() {
        let engine = engine_with(MockBackend::new(), 2);
        let jobs = vec![
            (gradient(8, 8), FilterSpec::Negative),
            (gradient(8, 8), FilterSpec::Blur(0)),
        ];
        let err = BatchCoordinator::new(&engine)
            .batch_each(&jobs, &CancelToken::new(), None)
            .unwrap_err();
        assert!(matches!(err, BatchError::Filter(FilterError::InvalidParameter { .. })));
        assert_eq!(engine.backend().call_count(), 0);
    }

    #[test]
    fn batch_cancel_mid_run() {
        let cancel = CancelToken::new();
        let hook_cancel = cancel.clone();
        let engine = engine_with(MockBackend::with_hook(move |_| hook_cancel.cancel()), 1);
        let sources = vec![gradient(64, 64), gradient(64, 64)];
        let (tx, rx) = mpsc::channel();
        let outcome = BatchCoordinator::new(&engine)
            .batch(&sources, &FilterSpec::Negative, &cancel, Some(tx))
            .unwrap();

        assert!(matches!(outcome, BatchOutcome::Cancelled));
        assert_eq!(engine.backend().call_count(), 1);
        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events.last(), Some(BatchEvent::Cancelled)));
        assert!(!events.iter().any(|e| matches!(
            e,
            BatchEvent::ImageCompleted { .. } | BatchEvent::Completed { .. }
        )));
    }

    #[test]
    fn batch_images_appends_filter() {
        let engine = engine_with(RustBackend::new(), 2);
        let images = vec![
            ImageData::new("a", "a.png", (*gradient(16, 16)).clone()),
            ImageData::new("b", "b.png", (*gradient(16, 16)).clone()),
        ];
        let updated = BatchCoordinator::new(&engine)
            .batch_images(&images, &FilterSpec::Sepia, &CancelToken::new(), None)
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].id, "b");
        assert_eq!(updated[1].applied_filters, vec![FilterSpec::Sepia]);
    }

    #[test]
    fn batch_images_missing_pixels_is_source_unavailable() {
        let engine = engine_with(MockBackend::new(), 2);
        let mut missing = ImageData::new("b", "b.png", (*gradient(4, 4)).clone());
        missing.buffer = None;
        let images = vec![ImageData::new("a", "a.png", (*gradient(4, 4)).clone()), missing];
        let err = BatchCoordinator::new(&engine)
            .batch_images(&images, &FilterSpec::Sepia, &CancelToken::new(), None)
            .unwrap_err();
        assert!(matches!(err, BatchError::SourceUnavailable { index: 1, .. }));
        assert_eq!(engine.backend().call_count(), 0);
    }

    // =========================================================================
    // Estimates
    // =========================================================================

    #[test]
    fn per_tile_costs() {
        assert_eq!(per_tile_cost(&FilterSpec::Grayscale), Duration::from_millis(10));
        assert_eq!(per_tile_cost(&FilterSpec::Blur(5)), Duration::from_millis(100));
        assert_eq!(
            per_tile_cost(&FilterSpec::Crop(CropRect::new(0, 0, 1, 1))),
            Duration::from_millis(3)
        );
    }

    #[test]
    fn estimate_scales_with_rounds() {
        let engine = FilterEngine::new(&config(256, 4)).unwrap();
        let coordinator = BatchCoordinator::new(&engine);
        // 4 tiles, one round.
        assert_eq!(
            coordinator.estimate((512, 512), &FilterSpec::Grayscale),
            Duration::from_millis(110)
        );
        // 16 tiles, four rounds.
        assert_eq!(
            coordinator.estimate((1024, 1024), &FilterSpec::Blur(3)),
            Duration::from_millis(60 * 4 + 100)
        );
        assert_eq!(
            coordinator.estimate_batch(&[(512, 512), (512, 512)], &FilterSpec::Grayscale),
            Duration::from_millis(220)
        );
    }
}
