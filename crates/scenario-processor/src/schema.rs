//! Schema inlining
//!
//! A scenario refers to its form or grid definition by name
//! (`options.schema`). The inliner loads `<module dir>/forms/<name>.json`,
//! applies the component- and mode-specific transforms and replaces the
//! reference with the resulting tree. Each scenario gets its own freshly
//! loaded copy, so two scenarios sharing a schema never share nodes.

use crate::dynamic::{
    escape_pointer_token, DynamicFieldKind, DynamicFieldRequest, DynamicFieldResolver,
};
use scenario_document::{flag, text, text_field, DocumentSource};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Component type of a scenario, as far as schema transforms care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// `custom-form`
    CustomForm,
    /// `custom-grid`
    CustomGrid,
    /// Anything else (no transforms)
    Other,
}

impl ComponentKind {
    /// Parse the scenario's `component` value
    #[must_use]
    pub fn parse(component: &str) -> Self {
        match component {
            "custom-form" => Self::CustomForm,
            "custom-grid" => Self::CustomGrid,
            _ => Self::Other,
        }
    }

    /// Whether dynamic field markers are scanned for this component
    #[inline]
    #[must_use]
    pub fn scans_dynamic_fields(self) -> bool {
        matches!(self, Self::CustomForm | Self::CustomGrid)
    }
}

/// Form mode (`options.schemaMode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaMode {
    /// New record form
    Insert,
    /// Edit form
    Update,
    /// Absent or unrecognised
    Unspecified,
}

impl SchemaMode {
    /// Parse the scenario's `schemaMode` value
    #[must_use]
    pub fn parse(mode: &str) -> Self {
        match mode {
            "insert" => Self::Insert,
            "update" => Self::Update,
            _ => Self::Unspecified,
        }
    }

    fn read_only_key(self) -> Option<&'static str> {
        match self {
            Self::Insert => Some("readOnly_for_insert"),
            Self::Update => Some("readOnly_for_update"),
            Self::Unspecified => None,
        }
    }
}

/// A scenario's reference to its schema document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    /// Schema document name (without extension)
    pub name: String,
    /// Form mode
    pub mode: SchemaMode,
    /// Scenario component type
    pub component: ComponentKind,
}

impl SchemaReference {
    /// Create reference
    #[must_use]
    pub fn new(name: impl Into<String>, mode: SchemaMode, component: ComponentKind) -> Self {
        Self {
            name: name.into(),
            mode,
            component,
        }
    }

    /// Extract the reference from a scenario object
    ///
    /// Only a textual `options.schema` is a reference; an already inlined
    /// tree or a null placeholder is not.
    #[must_use]
    pub fn from_scenario(scenario: &Map<String, Value>) -> Option<Self> {
        let options = scenario.get("options")?.as_object()?;
        let name = match options.get("schema")? {
            Value::String(name) => name.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let mode = text_field(options, "schemaMode").unwrap_or_default();
        let component = text_field(scenario, "component").unwrap_or_default();
        Some(Self::new(
            name,
            SchemaMode::parse(&mode),
            ComponentKind::parse(&component),
        ))
    }
}

/// What happened to one scenario's schema reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineOutcome {
    /// Schema loaded, transformed and inlined
    Inlined,
    /// Schema missing or unreadable; placeholder written
    Missing,
    /// Scenario or its options not found; document untouched
    Skipped,
}

/// Message stored in `options.schemaMessage` when a schema cannot be used
#[must_use]
pub fn missing_schema_message(name: &str) -> String {
    format!(
        "The configuration schema '{name}' does not exist or contains errors, check the configuration files"
    )
}

/// Loads, transforms and inlines scenario schemas
pub struct SchemaInliner<'a> {
    source: &'a dyn DocumentSource,
    resolver: &'a dyn DynamicFieldResolver,
    forms_dir: &'a str,
}

impl std::fmt::Debug for SchemaInliner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaInliner")
            .field("forms_dir", &self.forms_dir)
            .finish_non_exhaustive()
    }
}

impl<'a> SchemaInliner<'a> {
    /// Create inliner
    #[inline]
    #[must_use]
    pub fn new(
        source: &'a dyn DocumentSource,
        resolver: &'a dyn DynamicFieldResolver,
        forms_dir: &'a str,
    ) -> Self {
        Self {
            source,
            resolver,
            forms_dir,
        }
    }

    /// Path of a schema document next to the scenario document
    #[must_use]
    pub fn schema_path(&self, module_path: &Path, name: &str) -> PathBuf {
        module_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(self.forms_dir)
            .join(format!("{name}.json"))
    }

    /// Replace `scenarios.<scenario_key>.options.schema` with the loaded schema
    ///
    /// A missing or unparsable schema sets `schema` to null and
    /// `schemaMessage` to [`missing_schema_message`].
    pub fn inline(
        &self,
        document: &mut Value,
        scenario_key: &str,
        reference: &SchemaReference,
        module_path: &Path,
    ) -> InlineOutcome {
        let Some(options) = document
            .get_mut("scenarios")
            .and_then(|s| s.get_mut(scenario_key))
            .and_then(|s| s.get_mut("options"))
            .and_then(Value::as_object_mut)
        else {
            tracing::debug!("Scenario '{}' has no options to inline into", scenario_key);
            return InlineOutcome::Skipped;
        };

        let path = self.schema_path(module_path, &reference.name);
        match self.source.load(&path) {
            Ok(schema) => {
                let schema = self.transform(scenario_key, schema, reference);
                options.insert("schema".to_string(), schema);
                tracing::debug!(
                    "Schema '{}' loaded and processed for scenario '{}'",
                    reference.name,
                    scenario_key
                );
                InlineOutcome::Inlined
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::warn!("Schema file not found: {}", path.display());
                } else {
                    tracing::error!(
                        "Error processing schema '{}' for scenario '{}': {}",
                        reference.name,
                        scenario_key,
                        err
                    );
                }
                options.insert("schema".to_string(), Value::Null);
                options.insert(
                    "schemaMessage".to_string(),
                    Value::String(missing_schema_message(&reference.name)),
                );
                InlineOutcome::Missing
            }
        }
    }

    /// Apply component/mode transforms to a loaded schema
    #[must_use]
    pub fn transform(&self, scenario_key: &str, schema: Value, reference: &SchemaReference) -> Value {
        let mut schema = if reference.component == ComponentKind::CustomForm {
            prepare_form_schema(schema, reference.mode)
        } else {
            schema
        };

        if reference.component.scans_dynamic_fields() {
            self.resolve_dynamic_fields(scenario_key, &mut schema, "");
        }

        schema
    }

    fn resolve_dynamic_fields(&self, scenario_key: &str, node: &mut Value, pointer: &str) {
        match node {
            Value::Object(map) => {
                let mut resolved = Vec::new();
                for (key, marker) in map.iter() {
                    let Some(kind) = DynamicFieldKind::from_marker_key(key) else {
                        continue;
                    };
                    let Value::String(function) = marker else {
                        continue;
                    };
                    let request = DynamicFieldRequest {
                        scenario: scenario_key.to_string(),
                        kind,
                        function: function.clone(),
                        pointer: pointer.to_string(),
                    };
                    if let Some(value) = self.resolver.resolve(&request) {
                        resolved.push((kind.target_key(), value));
                    }
                }

                for (key, child) in map.iter_mut() {
                    let child_pointer = format!("{pointer}/{}", escape_pointer_token(key));
                    self.resolve_dynamic_fields(scenario_key, child, &child_pointer);
                }

                for (key, value) in resolved {
                    map.insert(key.to_string(), value);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.resolve_dynamic_fields(scenario_key, item, &format!("{pointer}/{index}"));
                }
            }
            _ => {}
        }
    }
}

/// Form transforms over the schema's `schema` field map
///
/// Every field gets `<field>_olof` appended to `fieldHtmlClass`; fields
/// flagged `readOnly_for_<mode>` become `readOnly`.
#[must_use]
pub fn prepare_form_schema(mut schema: Value, mode: SchemaMode) -> Value {
    let Some(fields) = schema.get_mut("schema").and_then(Value::as_object_mut) else {
        return schema;
    };

    for (field_key, field) in fields.iter_mut() {
        let Value::Object(field) = field else {
            continue;
        };

        let class = match field.get("fieldHtmlClass").and_then(text) {
            Some(existing) => format!("{existing} {field_key}_olof"),
            None => format!("{field_key}_olof"),
        };
        field.insert("fieldHtmlClass".to_string(), Value::String(class));

        if let Some(key) = mode.read_only_key() {
            if flag(field, key) {
                field.insert("readOnly".to_string(), Value::Bool(true));
            }
        }
    }

    schema
}
