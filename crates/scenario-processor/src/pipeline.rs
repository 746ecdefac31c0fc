//! Pipeline Orchestrator
//!
//! Sequences the stages for one request:
//!
//! ```text
//! load → schema inlining (per scenario) → effective role → role filter → breadcrumbs
//! ```
//!
//! Each disabled stage is an identity transform. The orchestrator holds no
//! per-request state, so one instance can serve concurrent callers.

use crate::breadcrumb::BreadcrumbGenerator;
use crate::config::ProcessorConfig;
use crate::dynamic::{DynamicFieldResolver, RecordingResolver};
use crate::error::{ProcessError, ProcessResult};
use crate::role::ProcessRequest;
use crate::role_filter::RoleFilter;
use crate::schema::{InlineOutcome, SchemaInliner, SchemaReference};
use scenario_document::{flag, DocumentCache, DocumentSource, FsDocumentSource};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Document after all enabled stages have run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    document: Value,
}

impl ProcessedDocument {
    /// Wrap an already processed tree
    #[inline]
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Full document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// `scenarios` submap
    ///
    /// # Errors
    ///
    /// [`ProcessError::ScenariosNotFound`] when absent or not an object.
    pub fn scenarios(&self) -> ProcessResult<&Map<String, Value>> {
        self.document
            .get("scenarios")
            .and_then(Value::as_object)
            .ok_or(ProcessError::ScenariosNotFound)
    }

    /// One scenario by exact key
    ///
    /// # Errors
    ///
    /// [`ProcessError::ScenariosNotFound`] without a `scenarios` map,
    /// [`ProcessError::ScenarioNotFound`] without that key.
    pub fn scenario(&self, key: &str) -> ProcessResult<&Value> {
        self.scenarios()?
            .get(key)
            .ok_or_else(|| ProcessError::ScenarioNotFound(key.to_string()))
    }

    /// Take the document
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.document
    }
}

/// Runs the scenario pipeline
pub struct ScenarioProcessor {
    source: Arc<dyn DocumentSource>,
    resolver: Arc<dyn DynamicFieldResolver>,
    config: ProcessorConfig,
}

impl std::fmt::Debug for ScenarioProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioProcessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScenarioProcessor {
    /// Create processor over a document source
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>, config: ProcessorConfig) -> Self {
        Self {
            source,
            resolver: Arc::new(RecordingResolver::new()),
            config,
        }
    }

    /// Create processor reading from a directory
    ///
    /// Applies the configured size limit and, when `cache_capacity > 0`, a
    /// parsed-document cache.
    #[must_use]
    pub fn from_base(base: impl Into<PathBuf>, config: ProcessorConfig) -> Self {
        let mut source = FsDocumentSource::new(base).with_max_file_size(config.max_file_size);
        if config.cache_capacity > 0 {
            source = source.with_cache(DocumentCache::new(config.cache_capacity));
        }
        Self::new(Arc::new(source), config)
    }

    /// Create processor reading from a directory, configured from a TOML file
    ///
    /// Without `config_path` the default configuration is used.
    ///
    /// # Errors
    ///
    /// [`ProcessError::Config`] when the file is unreadable or invalid.
    pub fn open(base: impl Into<PathBuf>, config_path: Option<&Path>) -> ProcessResult<Self> {
        let config = match config_path {
            Some(path) => {
                tracing::debug!("Loading processor config from {}", path.display());
                ProcessorConfig::load(path)?
            }
            None => ProcessorConfig::default(),
        };
        Ok(Self::from_base(base, config))
    }

    /// Replace the dynamic field resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn DynamicFieldResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Load and process one scenario document
    ///
    /// Schemas resolve against the parent directory of `document_path`.
    ///
    /// # Errors
    ///
    /// [`ProcessError::Load`] when the document cannot be read or parsed,
    /// [`ProcessError::InvalidDocument`] when its root is not an object.
    /// Per-scenario anomalies never fail the call.
    pub fn process(
        &self,
        document_path: impl AsRef<Path>,
        request: &ProcessRequest,
    ) -> ProcessResult<ProcessedDocument> {
        let document_path = document_path.as_ref();
        tracing::info!(
            "Processing {} for role {}",
            document_path.display(),
            request.role
        );

        let mut document = self.source.load(document_path)?;
        if !document.is_object() {
            return Err(ProcessError::InvalidDocument {
                path: document_path.to_path_buf(),
            });
        }

        if self.config.schema_inlining {
            self.inline_schemas(&mut document, document_path);
        }

        let document = if self.config.role_filter {
            let terms_required = document
                .get("options")
                .and_then(Value::as_object)
                .is_some_and(|options| flag(options, "serviceTermsRequired"));
            let role = request.effective_role(terms_required);
            if role != request.role {
                tracing::debug!("Service terms pending, filtering as '{}'", role);
            }
            RoleFilter::new(role, request.maintenance).apply(&document)
        } else {
            document
        };

        let document = if self.config.breadcrumbs {
            BreadcrumbGenerator::new(self.config.max_breadcrumb_depth).add_breadcrumbs(document)
        } else {
            document
        };

        tracing::info!("Processed {}", document_path.display());
        Ok(ProcessedDocument::new(document))
    }

    fn inline_schemas(&self, document: &mut Value, module_path: &Path) {
        let references: Vec<(String, SchemaReference)> = document
            .get("scenarios")
            .and_then(Value::as_object)
            .map(|scenarios| {
                scenarios
                    .iter()
                    .filter_map(|(key, scenario)| {
                        let reference = SchemaReference::from_scenario(scenario.as_object()?)?;
                        Some((key.clone(), reference))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let inliner = SchemaInliner::new(
            self.source.as_ref(),
            self.resolver.as_ref(),
            &self.config.forms_dir,
        );

        let mut missing = 0usize;
        for (key, reference) in &references {
            if inliner.inline(document, key, reference, module_path) == InlineOutcome::Missing {
                missing += 1;
            }
        }

        tracing::debug!(
            "Inlined {} schema reference(s), {} missing",
            references.len(),
            missing
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;
    use scenario_document::LoadError;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapSource(HashMap<PathBuf, Value>);

    impl MapSource {
        fn single(path: &str, document: Value) -> Arc<Self> {
            Arc::new(Self(HashMap::from([(PathBuf::from(path), document)])))
        }
    }

    impl DocumentSource for MapSource {
        fn load(&self, path: &Path) -> Result<Value, LoadError> {
            self.0.get(path).cloned().ok_or_else(|| {
                LoadError::io_error(path, std::io::Error::from(std::io::ErrorKind::NotFound))
            })
        }
    }

    #[test]
    fn read_operations() {
        let processed = ProcessedDocument::new(json!({"scenarios": {"home": {"title": "Home"}}}));

        assert_eq!(processed.scenarios().unwrap().len(), 1);
        assert_eq!(processed.scenario("home").unwrap()["title"], "Home");
        assert!(matches!(
            processed.scenario("Home"),
            Err(ProcessError::ScenarioNotFound(key)) if key == "Home"
        ));

        let empty = ProcessedDocument::new(json!({"options": {}}));
        assert!(matches!(empty.scenarios(), Err(ProcessError::ScenariosNotFound)));
        assert!(matches!(empty.scenario("home"), Err(ProcessError::ScenariosNotFound)));
    }

    #[test]
    fn non_object_root_is_invalid() {
        let processor =
            ScenarioProcessor::new(MapSource::single("main.json", json!([1, 2])), ProcessorConfig::default());

        let err = processor
            .process("main.json", &ProcessRequest::anonymous())
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidDocument { .. }));
    }

    #[test]
    fn missing_document_is_load_error() {
        let processor =
            ScenarioProcessor::new(MapSource::single("main.json", json!({})), ProcessorConfig::default());

        let err = processor
            .process("other.json", &ProcessRequest::anonymous())
            .unwrap_err();
        assert!(matches!(err, ProcessError::Load(ref e) if e.is_not_found()));
    }

    #[test]
    fn terms_pending_filters_as_unvalidated() {
        let document = json!({
            "options": {"serviceTermsRequired": true},
            "scenarios": {
                "terms": {"title": "Terms", "role": "@"},
                "admin": {"title": "Admin", "role": "admin"}
            }
        });
        let processor =
            ScenarioProcessor::new(MapSource::single("main.json", document), ProcessorConfig::default());

        let pending = ProcessRequest::new("admin").with_terms_accepted(false);
        let processed = processor.process("main.json", &pending).unwrap();
        let keys: Vec<_> = processed.scenarios().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["terms"]);

        let accepted = ProcessRequest::new("admin");
        let processed = processor.process("main.json", &accepted).unwrap();
        let keys: Vec<_> = processed.scenarios().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["admin"]);
    }

    #[test]
    fn disabled_stages_are_identity() {
        let document = json!({
            "scenarios": {
                "home": {"title": "Home", "options": {"actions-row": {"items": [{"goto-scenario": "secret"}]}}},
                "secret": {"title": "Secret", "role": "admin", "options": {"schema": "people"}}
            }
        });
        let config = ProcessorConfig::default()
            .with_schema_inlining(false)
            .with_role_filter(false)
            .with_breadcrumbs(false);
        let processor = ScenarioProcessor::new(MapSource::single("json/main.json", document.clone()), config);

        let processed = processor
            .process("json/main.json", &ProcessRequest::anonymous())
            .unwrap();
        assert_eq!(processed.into_value(), document);
    }

    #[test]
    fn resolver_receives_markers() {
        let mut documents = HashMap::new();
        documents.insert(
            PathBuf::from("json/main.json"),
            json!({"scenarios": {"grid": {"title": "Grid", "component": "custom-grid", "options": {"schema": "people"}}}}),
        );
        documents.insert(
            PathBuf::from("json/forms/people.json"),
            json!({"schema": {"city": {"type": "string", "enum_function": "cities"}}}),
        );
        let resolver = Arc::new(RecordingResolver::new());
        let processor = ScenarioProcessor::new(Arc::new(MapSource(documents)), ProcessorConfig::default())
            .with_resolver(resolver.clone());

        processor
            .process("json/main.json", &ProcessRequest::anonymous())
            .unwrap();

        let requests = resolver.take();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].scenario, "grid");
        assert_eq!(requests[0].pointer, "/schema/city");
    }

    #[test]
    fn open_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");

        std::fs::write(&path, "breadcrumbs = false\nmax_breadcrumb_depth = 4\n").unwrap();
        let processor = ScenarioProcessor::open(dir.path(), Some(path.as_path())).unwrap();
        assert!(!processor.config().breadcrumbs);
        assert_eq!(processor.config().max_breadcrumb_depth, 4);

        std::fs::write(&path, "breadcrumbs = \"maybe\"\n").unwrap();
        let err = ScenarioProcessor::open(dir.path(), Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ProcessError::Config(ConfigError::Parse(_))));

        let absent = dir.path().join("absent.toml");
        let err = ScenarioProcessor::open(dir.path(), Some(absent.as_path())).unwrap_err();
        assert!(matches!(err, ProcessError::Config(ConfigError::Io { .. })));

        let defaults = ScenarioProcessor::open(dir.path(), None).unwrap();
        assert_eq!(defaults.config(), &ProcessorConfig::default());
    }
}
