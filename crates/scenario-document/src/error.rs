//! Error types for document loading

use std::path::PathBuf;

/// Errors raised while loading a JSON document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Resolved path of the document
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON
    #[error("syntax error in {path}: {message}")]
    Syntax {
        /// Resolved path of the document
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Document exceeds the configured size limit
    #[error("{path} is too large: {size} bytes (max: {max})")]
    TooLarge {
        /// Resolved path of the document
        path: PathBuf,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for path
    pub fn syntax_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True when the document does not exist at all
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Path of the document that failed to load
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Syntax { path, .. } | Self::TooLarge { path, .. } => path,
        }
    }
}
