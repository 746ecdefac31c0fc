//! Content hashing for cache keys

use std::fmt::{self, Display, Formatter};

/// A 32-byte content hash (Blake3) of a document's raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_identical_hash() {
        let a = ContentHash::compute(br#"{"scenarios": {}}"#);
        let b = ContentHash::compute(br#"{"scenarios": {}}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn whitespace_changes_hash() {
        let a = ContentHash::compute(br#"{"scenarios": {}}"#);
        let b = ContentHash::compute(br#"{"scenarios":{}}"#);
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hex() {
        let hash = ContentHash::compute(b"main");
        let shown = hash.to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with(&hash.short()));
    }
}
