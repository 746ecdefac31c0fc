//! Scenario Document Loader
//!
//! Reads named JSON resources from a base directory and hands each caller
//! its own mutable tree.
//!
//! # Architecture
//!
//! ```text
//! base dir + relative path → bytes → ContentHash ─┬→ DocumentCache hit → clone
//!                                                  └→ serde_json parse → insert
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scenario_document::{DocumentSource, FsDocumentSource, DocumentCache};
//!
//! let source = FsDocumentSource::new("/srv/scenarios").with_cache(DocumentCache::default());
//! let document = source.load(Path::new("json/main.json"))?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod hash;
pub mod path;
pub mod source;

pub use cache::{CacheStats, DocumentCache};
pub use error::LoadError;
pub use hash::ContentHash;
pub use path::{flag, get_path, is_truthy, text, text_field};
pub use source::{DocumentSource, FsDocumentSource, DEFAULT_MAX_FILE_SIZE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
