//! Scenario Processor
//!
//! Turns a raw scenario document into the tree served to one caller:
//! schema references inlined, nodes the caller may not see pruned, and a
//! breadcrumb chain attached to every reachable scenario.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ScenarioProcessor                        │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │SchemaInliner │ → │  RoleFilter  │ → │BreadcrumbGenerator│ │
//! │  └──────┬───────┘   └──────────────┘   └──────────────────┘  │
//! │         │ DynamicFieldResolver                                │
//! └─────────┼────────────────────────────────────────────────────┘
//!           ▼
//!     DocumentSource (scenario-document)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scenario_processor::{ProcessRequest, ProcessorConfig, ScenarioProcessor};
//!
//! let processor = ScenarioProcessor::from_base("/srv/app", ProcessorConfig::default());
//! let processed = processor.process("json/main.json", &ProcessRequest::new("operator"))?;
//! let people = processed.scenario("people-list")?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod breadcrumb;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod pipeline;
pub mod role;
pub mod role_filter;
pub mod schema;

pub use breadcrumb::{add_breadcrumbs, BreadcrumbEntry, BreadcrumbGenerator, Breadcrumbs, ParentIndex};
pub use config::{ProcessorConfig, DEFAULT_FORMS_DIR, DEFAULT_MAX_BREADCRUMB_DEPTH};
pub use dynamic::{DynamicFieldKind, DynamicFieldRequest, DynamicFieldResolver, RecordingResolver};
pub use error::{ConfigError, ProcessError, ProcessResult};
pub use pipeline::{ProcessedDocument, ScenarioProcessor};
pub use role::{ProcessRequest, Role};
pub use role_filter::{filter_by_role, is_role_authorized, Removal, RoleFilter};
pub use schema::{
    missing_schema_message, prepare_form_schema, ComponentKind, InlineOutcome, SchemaInliner,
    SchemaMode, SchemaReference,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
