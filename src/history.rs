//! Bounded undo/redo over whole-image snapshots.
//!
//! Every edit stores the full result buffer (shared, so snapshots that are
//! also cached or displayed cost nothing extra) together with the list of
//! filters that produced it. A new edit after an undo discards the redo
//! branch. Once more than [`HISTORY_CAPACITY`] snapshots exist the oldest is
//! dropped; the original image stays available to [`EditHistory::reset`].

use crate::buffer::PixelBuffer;
use crate::imaging::FilterSpec;
use std::sync::Arc;

pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
struct Snapshot {
    buffer: Arc<PixelBuffer>,
    filters: Vec<FilterSpec>,
}

#[derive(Debug, Clone)]
pub struct EditHistory {
    original: Arc<PixelBuffer>,
    snapshots: Vec<Snapshot>,
    index: usize,
    capacity: usize,
}

impl EditHistory {
    pub fn new(original: Arc<PixelBuffer>) -> Self {
        Self::with_capacity(original, HISTORY_CAPACITY)
    }

    /// `capacity` is clamped to at least 1.
    pub fn with_capacity(original: Arc<PixelBuffer>, capacity: usize) -> Self {
        Self {
            snapshots: vec![Snapshot {
                buffer: Arc::clone(&original),
                filters: Vec::new(),
            }],
            original,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record `result` as the outcome of applying `filter` to the current
    /// snapshot.
    pub fn push(&mut self, result: Arc<PixelBuffer>, filter: FilterSpec) {
        let mut filters = self.snapshots[self.index].filters.clone();
        filters.push(filter);

        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(Snapshot {
            buffer: result,
            filters,
        });
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one edit, returning the new current buffer.
    pub fn undo(&mut self) -> Option<Arc<PixelBuffer>> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(Arc::clone(self.current()))
    }

    /// Step forward one edit, returning the new current buffer.
    pub fn redo(&mut self) -> Option<Arc<PixelBuffer>> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(Arc::clone(self.current()))
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &Arc<PixelBuffer> {
        &self.snapshots[self.index].buffer
    }

    /// Filters applied to the original to reach the current snapshot.
    pub fn applied_filters(&self) -> &[FilterSpec] {
        &self.snapshots[self.index].filters
    }

    /// Drop every edit and return to the original image.
    pub fn reset(&mut self) {
        self.snapshots = vec![Snapshot {
            buffer: Arc::clone(&self.original),
            filters: Vec::new(),
        }];
        self.index = 0;
    }

    /// Number of snapshots held, including the current one.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Zero-based position of the current snapshot.
    pub fn position(&self) -> usize {
        self.index
    }
}
