//! Cached filter application.
//!
//! [`FilterEngine`] is the service a front end holds for the lifetime of the
//! process. It owns the filter backend, the [`FilterResultCache`] and the
//! [`TileScheduler`], and is constructed once from an [`EngineConfig`]:
//!
//! - [`apply`](FilterEngine::apply): whole-image, synchronous, cached.
//! - [`apply_tiled`](FilterEngine::apply_tiled): through the scheduler with
//!   progress events and cancellation, cached.
//! - [`preview`](FilterEngine::preview): downsample to the preview size, then
//!   [`apply`](FilterEngine::apply).
//! - [`apply_to_image`](FilterEngine::apply_to_image): the same for an
//!   [`ImageData`] record, which also remembers the filters applied to it.
//!
//! Everything takes `&self`; the engine is `Sync` and can be shared between
//! threads by reference.

use crate::buffer::PixelBuffer;
use crate::cache::{CacheStats, FilterResultCache, Fingerprint};
use crate::config::EngineConfig;
use crate::imaging::{FilterBackend, FilterError, FilterSpec, RustBackend, fit_within, resize_exact};
use crate::tiling::{CancelToken, ProgressEvent, TileError, TileOutcome, TileScheduler, emit};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use tracing::debug;

/// An image being edited: its pixels (once decoded) and the filters applied
/// to reach them.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub id: String,
    pub name: String,
    /// `None` until the image has been decoded.
    pub buffer: Option<Arc<PixelBuffer>>,
    pub applied_filters: Vec<FilterSpec>,
}

impl ImageData {
    pub fn new(id: impl Into<String>, name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            buffer: Some(Arc::new(buffer)),
            applied_filters: Vec::new(),
        }
    }
}

pub struct FilterEngine<B: FilterBackend = RustBackend> {
    backend: B,
    cache: FilterResultCache,
    scheduler: TileScheduler,
    preview_max_size: u32,
}

impl FilterEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, TileError> {
        Self::with_backend(config, RustBackend::new())
    }
}

impl<B: FilterBackend> FilterEngine<B> {
    /// Build an engine around a specific backend (allows testing with mock).
    pub fn with_backend(config: &EngineConfig, backend: B) -> Result<Self, TileError> {
        Ok(Self {
            backend,
            cache: FilterResultCache::new(&config.cache),
            scheduler: TileScheduler::new(config.tiling)?,
            preview_max_size: config.preview.max_size,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn scheduler(&self) -> &TileScheduler {
        &self.scheduler
    }

    /// Apply `spec` to the whole image, reusing a cached result when the
    /// same pixels were already filtered the same way.
    pub fn apply(
        &self,
        source: &PixelBuffer,
        spec: &FilterSpec,
    ) -> Result<Arc<PixelBuffer>, FilterError> {
        spec.validate()?;
        let fingerprint = Fingerprint::of(source);
        if let Some(hit) = self.cache.get(fingerprint, spec) {
            return Ok(hit);
        }

        let result = Arc::new(self.backend.apply(source, spec)?);
        self.cache.put(fingerprint, spec, Arc::clone(&result));
        Ok(result)
    }

    /// Apply `spec` tile by tile on the scheduler's pool.
    ///
    /// A cache hit skips the scheduler and reports `Started` then
    /// `Completed` on `events`.
    pub fn apply_tiled(
        &self,
        source: &PixelBuffer,
        spec: &FilterSpec,
        cancel: &CancelToken,
        events: Option<Sender<ProgressEvent>>,
    ) -> Result<TileOutcome, TileError> {
        if let Err(e) = spec.validate() {
            emit(&events, ProgressEvent::Started);
            emit(&events, ProgressEvent::Error { message: e.to_string() });
            return Err(e.into());
        }
        let fingerprint = Fingerprint::of(source);
        if let Some(hit) = self.cache.get(fingerprint, spec) {
            debug!(filter = spec.kind_name(), "served from cache");
            emit(&events, ProgressEvent::Started);
            emit(
                &events,
                ProgressEvent::Completed {
                    result: Arc::clone(&hit),
                },
            );
            return Ok(TileOutcome::Completed(hit));
        }

        let outcome = self
            .scheduler
            .run_with_backend(&self.backend, source, spec, cancel, events)?;
        if let TileOutcome::Completed(result) = &outcome {
            self.cache.put(fingerprint, spec, Arc::clone(result));
        }
        Ok(outcome)
    }

    /// Render a quick preview: downsample so the longer edge fits the
    /// configured preview size (never upscaling), then apply `spec`.
    pub fn preview(
        &self,
        source: &PixelBuffer,
        spec: &FilterSpec,
    ) -> Result<Arc<PixelBuffer>, FilterError> {
        let (w, h) = fit_within(source.dimensions(), self.preview_max_size);
        if (w, h) == source.dimensions() {
            return self.apply(source, spec);
        }
        let small = resize_exact(source, w, h)?;
        self.apply(&small, spec)
    }

    /// Apply `spec` to an image record, returning the updated record.
    pub fn apply_to_image(
        &self,
        image: &ImageData,
        spec: &FilterSpec,
    ) -> Result<ImageData, FilterError> {
        let source = image
            .buffer
            .as_ref()
            .ok_or_else(|| FilterError::SourceUnavailable(image.id.clone()))?;
        let result = self.apply(source, spec)?;

        let mut applied_filters = image.applied_filters.clone();
        applied_filters.push(*spec);
        Ok(ImageData {
            buffer: Some(result),
            applied_filters,
            ..image.clone()
        })
    }

    pub fn clear_cache(&self) {
        self.cache.evict_all();
    }

    /// Bytes of pixel data held by the result cache.
    pub fn cache_size(&self) -> usize {
        self.cache.current_size()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
