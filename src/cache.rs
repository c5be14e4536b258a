//! In-memory cache of filter results.
//!
//! Filtering a full-resolution photo is the expensive part of every edit. A
//! user flicking between filters or undoing and re-applying the same one
//! should not pay for it twice, so every successful application is kept
//! here, keyed by what was computed rather than by which buffer object it
//! was computed from.
//!
//! ## Keys
//!
//! The cache is **content-addressed**: a key is the [`Fingerprint`] of the
//! source pixels plus the [`FilterSpec`]. The fingerprint is SHA-256 over the
//! dimensions, channel layout and raw bytes, so two separately decoded
//! copies of the same photo share entries.
//!
//! ## Bounds
//!
//! Two limits apply, whichever is hit first: a maximum entry count and a
//! maximum total of buffer bytes. Eviction drops the least recently used
//! entry. A result larger than the whole byte budget is returned to the
//! caller but never stored.
//!
//! ## Ownership
//!
//! Values are `Arc<PixelBuffer>`. Eviction drops the cache's reference
//! only; a caller that still holds a result keeps a valid buffer.

use crate::buffer::PixelBuffer;
use crate::config::CacheConfig;
use crate::imaging::FilterSpec;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Content fingerprint of a pixel buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(buffer: &PixelBuffer) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(buffer.width().to_le_bytes());
        hasher.update(buffer.height().to_le_bytes());
        hasher.update([buffer.channels().count() as u8]);
        hasher.update(buffer.data());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first 6 bytes are plenty to tell entries apart in logs.
        let hex = self.to_string();
        write!(f, "Fingerprint({})", &hex[..12])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: Fingerprint,
    spec: FilterSpec,
}

/// Hit/miss counters since the cache was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.evictions > 0 {
            write!(
                f,
                "{} cached, {} computed ({} total), {} evicted",
                self.hits,
                self.misses,
                self.total(),
                self.evictions
            )
        } else {
            write!(
                f,
                "{} cached, {} computed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        }
    }
}

struct Inner {
    entries: LruCache<CacheKey, Arc<PixelBuffer>>,
    current_bytes: usize,
    stats: CacheStats,
}

/// Bounded LRU of filter results, safe to share between threads.
pub struct FilterResultCache {
    max_entries: usize,
    max_bytes: usize,
    inner: Mutex<Inner>,
}

impl FilterResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            max_entries: config.max_entries.max(1),
            max_bytes: config.max_bytes.max(1),
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                current_bytes: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    // A panic while holding the lock cannot leave the LRU half-updated in a
    // way that matters to readers, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a result and mark it most recently used.
    pub fn get(&self, fingerprint: Fingerprint, spec: &FilterSpec) -> Option<Arc<PixelBuffer>> {
        let key = CacheKey {
            fingerprint,
            spec: *spec,
        };
        let mut inner = self.lock();
        match inner.entries.get(&key).cloned() {
            Some(hit) => {
                inner.stats.hits += 1;
                trace!(?fingerprint, filter = spec.kind_name(), "cache hit");
                Some(hit)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store a result, evicting least recently used entries until both
    /// bounds hold again. Replaces any existing entry for the same key.
    pub fn put(&self, fingerprint: Fingerprint, spec: &FilterSpec, result: Arc<PixelBuffer>) {
        let size = result.byte_size();
        if size > self.max_bytes {
            debug!(
                size,
                max_bytes = self.max_bytes,
                "result larger than cache budget, not cached"
            );
            return;
        }

        let key = CacheKey {
            fingerprint,
            spec: *spec,
        };
        let mut inner = self.lock();
        if let Some(old) = inner.entries.put(key, result) {
            inner.current_bytes -= old.byte_size();
        }
        inner.current_bytes += size;

        while inner.entries.len() > self.max_entries || inner.current_bytes > self.max_bytes {
            let Some((evicted_key, evicted)) = inner.entries.pop_lru() else {
                break;
            };
            inner.current_bytes -= evicted.byte_size();
            inner.stats.evictions += 1;
            debug!(
                fingerprint = ?evicted_key.fingerprint,
                filter = evicted_key.spec.kind_name(),
                "evicted cached result"
            );
        }
    }

    /// Drop every entry. Buffers still held by callers stay alive.
    pub fn evict_all(&self) {
        let mut inner = self.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.current_bytes = 0;
        inner.stats.evictions += count as u64;
    }

    /// Total bytes of pixel data currently held.
    pub fn current_size(&self) -> usize {
        self.lock().current_bytes
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

impl Default for FilterResultCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
