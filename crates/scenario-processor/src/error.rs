//! Error types for the scenario pipeline
//!
//! Only whole-document failures surface here. Per-scenario anomalies
//! (missing schema, breadcrumb cycles, malformed nodes) degrade inside the
//! returned document instead.

use scenario_document::LoadError;
use std::path::PathBuf;

/// Errors reading a [`crate::ProcessorConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during config read
    #[error("io error reading config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML or unknown values
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Source document could not be loaded
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    /// Source document root is not a JSON object
    #[error("invalid document {path}: root must be an object")]
    InvalidDocument {
        /// Document path as requested
        path: PathBuf,
    },

    /// Processed document has no `scenarios` map
    #[error("no scenarios found")]
    ScenariosNotFound,

    /// Processed document has no scenario with this key
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ProcessError {
    /// True for the not-found conditions of the read operations
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ScenariosNotFound | Self::ScenarioNotFound(_))
    }
}

/// Result type alias for pipeline operations
pub type ProcessResult<T> = Result<T, ProcessError>;
