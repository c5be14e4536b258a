//! # Tessera
//!
//! A photo-editing engine: fifteen deterministic pixel filters, a tile
//! scheduler that spreads one filter over a bounded worker pool, a
//! content-addressed cache of results, and the batch, pipeline and
//! undo/redo machinery a front end builds on.
//!
//! # Architecture
//!
//! ```text
//!               ┌──────────── FilterEngine ────────────┐
//! PixelBuffer → │ FilterResultCache → TileScheduler →  │ → Arc<PixelBuffer>
//!               │                     FilterBackend    │
//!               └──────────────────────────────────────┘
//!                         ↑ BatchCoordinator (pipeline / batch)
//!                         ↑ EditHistory (undo / redo)
//! ```
//!
//! Filters never mutate their input. Every result is a fresh buffer behind an
//! `Arc`, so the same image can sit in the cache, the history and a caller's
//! display at once, and dropping it from one of them never invalidates the
//! others.
//!
//! Long operations report progress as events on an `std::sync::mpsc`
//! channel. The producer never blocks on the consumer; a caller that passes
//! `None` simply gets no progress.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`buffer`] | `PixelBuffer`: owned RGB/RGBA pixels, tile extract/blit, `image` conversions |
//! | [`imaging`] | `FilterSpec`, the filter algorithms, the `filterName:p1,p2` codec |
//! | [`histogram`] | Per-channel histograms and summary statistics |
//! | [`tiling`] | `TileScheduler`: partition, bounded fan-out, reassembly, cancellation |
//! | [`cache`] | `FilterResultCache`: SHA-256 fingerprinted LRU of results |
//! | [`engine`] | `FilterEngine`: cached apply, tiled apply, preview, `ImageData` |
//! | [`batch`] | `BatchCoordinator`: pipelines, batches, time estimates |
//! | [`history`] | `EditHistory`: bounded undo/redo |
//! | [`config`] | `tessera.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tiling Is Not Observable
//!
//! For pointwise filters the tiled result equals whole-image application
//! exactly, at any tile size. Neighbourhood filters (blur, sharpen, edge
//! detection) see tile edges as image edges under the default
//! [`SeamPolicy::Clamp`](tiling::SeamPolicy::Clamp); opting into
//! [`SeamPolicy::Halo`](tiling::SeamPolicy::Halo) pads every tile so the
//! output matches whole-image application there too.
//!
//! ## One Service, Explicitly Constructed
//!
//! The cache and worker pool live inside a [`engine::FilterEngine`] built
//! once from an [`config::EngineConfig`]. There is no global state; tests
//! build as many engines as they like.
//!
//! ## Pure-Rust Imaging
//!
//! Pixel math is plain Rust over `u8` slices. The `image` crate is used for
//! decoding and encoding at the edges and for quarter-turn rotation, flips
//! and resampling.

pub mod batch;
pub mod buffer;
pub mod cache;
pub mod config;
pub mod engine;
pub mod histogram;
pub mod history;
pub mod imaging;
pub mod output;
pub mod tiling;
