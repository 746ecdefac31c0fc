//! Testing utilities for the scenario workspace
//!
//! Shared document sources, on-disk fixtures and scenario builders.

#![allow(missing_docs)]

use parking_lot::Mutex;
use scenario_document::{DocumentSource, LoadError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// In-memory document source that counts loads
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: Mutex<HashMap<PathBuf, Value>>,
    loads: Mutex<Vec<PathBuf>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: impl Into<PathBuf>, document: Value) -> Self {
        self.insert(path, document);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, document: Value) {
        self.documents.lock().insert(path.into(), document);
    }

    /// Paths requested so far, in order
    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().clone()
    }
}

impl DocumentSource for MemorySource {
    fn load(&self, path: &Path) -> Result<Value, LoadError> {
        self.loads.lock().push(path.to_path_buf());
        self.documents.lock().get(path).cloned().ok_or_else(|| {
            LoadError::io_error(path, std::io::Error::from(std::io::ErrorKind::NotFound))
        })
    }
}

/// Scenario root on disk: `json/<app>.json` plus `json/forms/<schema>.json`
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `json/<app>.json`, returning its path relative to the root
    pub fn app(&self, app: &str, document: &Value) -> PathBuf {
        let relative = PathBuf::from("json").join(format!("{app}.json"));
        self.write_json(&relative, document);
        relative
    }

    /// Write `json/forms/<name>.json`
    pub fn form(&self, name: &str, schema: &Value) {
        self.write_json(Path::new("json/forms").join(format!("{name}.json")), schema);
    }

    pub fn write_json(&self, relative: impl AsRef<Path>, document: &Value) {
        let text = serde_json::to_string_pretty(document).unwrap();
        self.write_raw(relative, text.as_bytes());
    }

    pub fn write_raw(&self, relative: impl AsRef<Path>, bytes: &[u8]) {
        let full = self.dir.path().join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, bytes).unwrap();
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Action group with one `goto-scenario` item per target
pub fn goto_items(targets: &[&str]) -> Value {
    let items: Vec<Value> = targets
        .iter()
        .map(|target| json!({"goto-scenario": target}))
        .collect();
    json!({"items": items})
}

/// Action group with a single `_list` item
pub fn list_items(targets: &[&str]) -> Value {
    json!({"items": [{"goto-scenario": "_list", "list-scenario": targets}]})
}

/// Small navigation graph: home → people (list) → person-form (schema "person")
pub fn sample_app() -> Value {
    json!({
        "options": {"serviceTermsRequired": true},
        "scenarios": {
            "home": {
                "title": "Home",
                "route": "/",
                "options": {"actions-top": goto_items(&["people"])}
            },
            "people": {
                "title": "People",
                "route": "/people",
                "roles": ["*"],
                "options": {
                    "actions-row": list_items(&["person-form", "person-view"]),
                    "actions-bottom": {"items": [
                        {"title": "Export", "backend": true},
                        {"title": "Purge", "role": "admin"}
                    ]}
                }
            },
            "person-form": {
                "title": "Person",
                "breadcrumb": "Edit person",
                "component": "custom-form",
                "roles": ["*"],
                "options": {"schema": "person", "schemaMode": "update"}
            },
            "person-view": {
                "title": "Person details",
                "roles": ["*"],
                "options": {"schema": "person-view"}
            },
            "login": {
                "title": "Login",
                "only-not-logged": true
            },
            "terms": {
                "title": "Terms",
                "role": "@"
            },
            "maintenance": {
                "title": "Down for maintenance",
                "show_in_maintenance": true
            }
        }
    })
}

/// Form schema matching the `person` reference of [`sample_app`]
pub fn sample_person_schema() -> Value {
    json!({
        "schema": {
            "name": {"type": "string", "fieldHtmlClass": "wide"},
            "code": {"type": "string", "readOnly_for_update": true},
            "city": {"type": "string", "enum_function": "cities"}
        },
        "form": ["name", "code", "city"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_records_loads() {
        let source = MemorySource::new().with_document("a.json", json!({"x": 1}));
        assert_eq!(source.load(Path::new("a.json")).unwrap()["x"], 1);
        assert!(source.load(Path::new("b.json")).unwrap_err().is_not_found());
        assert_eq!(source.loads(), [PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }

    #[test]
    fn fixture_layout() {
        let fixture = FixtureDir::new();
        let app = fixture.app("main", &json!({"scenarios": {}}));
        fixture.form("person", &sample_person_schema());

        assert_eq!(app, PathBuf::from("json/main.json"));
        assert!(fixture.path().join("json/main.json").is_file());
        assert!(fixture.path().join("json/forms/person.json").is_file());
    }
}
