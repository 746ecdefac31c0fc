//! Content-addressed document cache using moka
//!
//! Parsed trees are stored by the hash of the bytes they were parsed from,
//! so an edited file never serves a stale tree. Callers always receive an
//! owned copy; cached trees are never handed out for mutation.

use crate::hash::ContentHash;
use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Cache of parsed documents keyed by content hash
#[derive(Debug, Clone)]
pub struct DocumentCache {
    inner: Cache<ContentHash, Arc<Value>>,
}

impl DocumentCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Insert a parsed document
    #[inline]
    pub fn insert(&self, hash: ContentHash, document: Value) {
        self.inner.insert(hash, Arc::new(document));
    }

    /// Get an owned copy of a cached document
    #[inline]
    #[must_use]
    pub fn get(&self, hash: &ContentHash) -> Option<Value> {
        self.inner.get(hash).map(|doc| (*doc).clone())
    }

    /// Get a cached copy or parse and insert
    ///
    /// # Errors
    /// Propagates the error of `parse`; nothing is cached in that case.
    pub fn try_get_or_insert_with<E, F>(&self, hash: ContentHash, parse: F) -> Result<Value, E>
    where
        F: FnOnce() -> Result<Value, E>,
    {
        if let Some(cached) = self.get(&hash) {
            tracing::trace!("document cache hit: {}", hash.short());
            return Ok(cached);
        }

        let document = parse()?;
        self.insert(hash, document.clone());
        Ok(document)
    }

    /// Check if cache contains hash
    #[inline]
    #[must_use]
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.inner.contains_key(hash)
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for DocumentCache {
    /// Create cache with default capacity (256 documents)
    fn default() -> Self {
        Self::new(256)
    }
}
