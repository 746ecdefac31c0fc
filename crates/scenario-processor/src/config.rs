//! Pipeline configuration
//!
//! Each processing stage can be switched off independently; a disabled
//! stage passes the document through untouched.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default recursion guard for breadcrumb search
pub const DEFAULT_MAX_BREADCRUMB_DEPTH: usize = 10;

/// Default sibling directory of schema documents
pub const DEFAULT_FORMS_DIR: &str = "forms";

/// Scenario pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Inline `options.schema` references
    pub schema_inlining: bool,
    /// Prune nodes the caller may not see
    pub role_filter: bool,
    /// Attach breadcrumb chains to scenarios
    pub breadcrumbs: bool,
    /// Breadcrumb recursion guard
    pub max_breadcrumb_depth: usize,
    /// Directory, next to the scenario document, holding schema documents
    pub forms_dir: String,
    /// Maximum document size in bytes
    pub max_file_size: usize,
    /// Parsed-document cache entries (0 disables caching)
    pub cache_capacity: u64,
}

impl ProcessorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file is unreadable or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With schema inlining toggled
    #[inline]
    #[must_use]
    pub fn with_schema_inlining(mut self, enabled: bool) -> Self {
        self.schema_inlining = enabled;
        self
    }

    /// With role filtering toggled
    #[inline]
    #[must_use]
    pub fn with_role_filter(mut self, enabled: bool) -> Self {
        self.role_filter = enabled;
        self
    }

    /// With breadcrumbs toggled
    #[inline]
    #[must_use]
    pub fn with_breadcrumbs(mut self, enabled: bool) -> Self {
        self.breadcrumbs = enabled;
        self
    }

    /// With breadcrumb recursion guard
    #[inline]
    #[must_use]
    pub fn with_max_breadcrumb_depth(mut self, depth: usize) -> Self {
        self.max_breadcrumb_depth = depth;
        self
    }

    /// With schema directory name
    #[inline]
    #[must_use]
    pub fn with_forms_dir(mut self, dir: impl Into<String>) -> Self {
        self.forms_dir = dir.into();
        self
    }

    /// With document cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            schema_inlining: true,
            role_filter: true,
            breadcrumbs: true,
            max_breadcrumb_depth: DEFAULT_MAX_BREADCRUMB_DEPTH,
            forms_dir: DEFAULT_FORMS_DIR.to_string(),
            max_file_size: scenario_document::DEFAULT_MAX_FILE_SIZE,
            cache_capacity: 0,
        }
    }
}
