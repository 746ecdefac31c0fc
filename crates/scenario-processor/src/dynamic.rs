//! Dynamic field extension point
//!
//! Form and grid schemas can name a function that populates a field's
//! choices at request time (`enum_function`, `search_enum_function`). The
//! pipeline does not run these itself: it hands each marker to a
//! [`DynamicFieldResolver`]. The default [`RecordingResolver`] only records
//! what was asked for.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// Kind of dynamic marker found in a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicFieldKind {
    /// `enum_function`: populates `enum`
    Enum,
    /// `search_enum_function`: populates `search_enum`
    SearchEnum,
}

impl DynamicFieldKind {
    /// Key naming the function
    #[inline]
    #[must_use]
    pub const fn marker_key(self) -> &'static str {
        match self {
            Self::Enum => "enum_function",
            Self::SearchEnum => "search_enum_function",
        }
    }

    /// Key receiving the resolved value
    #[inline]
    #[must_use]
    pub const fn target_key(self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::SearchEnum => "search_enum",
        }
    }

    /// Kind for a marker key
    #[must_use]
    pub fn from_marker_key(key: &str) -> Option<Self> {
        [Self::Enum, Self::SearchEnum]
            .into_iter()
            .find(|kind| kind.marker_key() == key)
    }
}

/// One dynamic marker located in an inlined schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicFieldRequest {
    /// Scenario whose schema holds the marker
    pub scenario: String,
    /// Marker kind
    pub kind: DynamicFieldKind,
    /// Function name
    pub function: String,
    /// JSON pointer, inside the schema, of the object holding the marker
    pub pointer: String,
}

/// Resolves dynamic field markers
pub trait DynamicFieldResolver: Send + Sync {
    /// Resolve one marker
    ///
    /// `Some(value)` is written next to the marker under
    /// [`DynamicFieldKind::target_key`]; `None` leaves the schema unchanged.
    fn resolve(&self, request: &DynamicFieldRequest) -> Option<Value>;
}

/// Default resolver: records requests and resolves nothing
#[derive(Debug, Default)]
pub struct RecordingResolver {
    requests: Mutex<Vec<DynamicFieldRequest>>,
}

impl RecordingResolver {
    /// Create empty resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests recorded so far
    #[must_use]
    pub fn requests(&self) -> Vec<DynamicFieldRequest> {
        self.requests.lock().clone()
    }

    /// Drain recorded requests
    pub fn take(&self) -> Vec<DynamicFieldRequest> {
        std::mem::take(&mut *self.requests.lock())
    }
}

impl DynamicFieldResolver for RecordingResolver {
    fn resolve(&self, request: &DynamicFieldRequest) -> Option<Value> {
        tracing::debug!(
            "Dynamic {:?} function requested by '{}': {} at {}",
            request.kind,
            request.scenario,
            request.function,
            request.pointer
        );
        self.requests.lock().push(request.clone());
        None
    }
}

/// Escape one JSON pointer reference token (RFC 6901)
pub(crate) fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
