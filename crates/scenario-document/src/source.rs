//! Document sources
//!
//! A [`DocumentSource`] turns a relative path into a freshly owned JSON
//! tree. The filesystem source is the only component that touches disk.

use crate::cache::DocumentCache;
use crate::error::LoadError;
use crate::hash::ContentHash;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default maximum document size (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Loads JSON documents by path
///
/// Every call must return an independent tree: callers mutate what they get.
pub trait DocumentSource: Send + Sync {
    /// Load and parse the document at `path`
    ///
    /// # Errors
    /// Returns [`LoadError`] when the document is missing, unreadable or not
    /// valid JSON.
    fn load(&self, path: &Path) -> Result<Value, LoadError>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<S> {
    fn load(&self, path: &Path) -> Result<Value, LoadError> {
        (**self).load(path)
    }
}

/// Filesystem-backed document source rooted at a base directory
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    base: PathBuf,
    max_file_size: usize,
    cache: Option<DocumentCache>,
}

impl FsDocumentSource {
    /// Create a source rooted at `base`, without caching
    #[inline]
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            cache: None,
        }
    }

    /// With maximum document size in bytes
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, max: usize) -> Self {
        self.max_file_size = max;
        self
    }

    /// With parse cache
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: DocumentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Base directory
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Parse cache, if enabled
    #[inline]
    #[must_use]
    pub fn cache(&self) -> Option<&DocumentCache> {
        self.cache.as_ref()
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Value, LoadError> {
        serde_json::from_slice(bytes).map_err(|e| LoadError::syntax_error(path, e.to_string()))
    }
}

impl DocumentSource for FsDocumentSource {
    fn load(&self, path: &Path) -> Result<Value, LoadError> {
        let full_path = self.base.join(path);

        let bytes = std::fs::read(&full_path).map_err(|e| LoadError::io_error(&full_path, e))?;

        if bytes.len() > self.max_file_size {
            return Err(LoadError::TooLarge {
                path: full_path,
                size: bytes.len(),
                max: self.max_file_size,
            });
        }

        match &self.cache {
            Some(cache) => {
                let hash = ContentHash::compute(&bytes);
                cache.try_get_or_insert_with(hash, || Self::parse(&full_path, &bytes))
            }
            None => Self::parse(&full_path, &bytes),
        }
    }
}
