//! Cross-session card artifact cache using moka
//!
//! Card artifacts depend on the record alone, so they are keyed by
//! `record_id` and survive filter changes and session boundaries.

use cef_charts::CardArtifacts;
use cef_record::RecordId;
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Card artifacts by record id
///
/// Cloning is cheap and clones share entries.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    inner: Cache<RecordId, Arc<CardArtifacts>>,
}

impl ArtifactCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Insert artifacts
    #[inline]
    pub async fn insert(&self, id: RecordId, artifacts: Arc<CardArtifacts>) {
        self.inner.insert(id, artifacts).await;
    }

    /// Cached artifacts for a record
    #[inline]
    pub async fn get(&self, id: &RecordId) -> Option<Arc<CardArtifacts>> {
        self.inner.get(id).await
    }

    /// Flush pending maintenance so counts are exact
    #[inline]
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ArtifactCache {
    /// Cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}
