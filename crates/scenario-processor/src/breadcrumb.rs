//! Breadcrumb derivation
//!
//! Scenarios form a directed graph: `A → B` when one of A's
//! `actions-top`/`actions-row` items has `goto-scenario: B`, or
//! `goto-scenario: _list` with B in its `list-scenario` array. Target
//! matching is case-insensitive.
//!
//! For each scenario the generator walks incoming edges backwards, always
//! taking the first parent in document order, and attaches the resulting
//! root-to-leaf chain. The walk is bounded by a fixed depth so cyclic
//! graphs terminate with a partial chain.

use crate::config::DEFAULT_MAX_BREADCRUMB_DEPTH;
use scenario_document::text_field;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

const ACTION_GROUPS: [&str; 2] = ["actions-top", "actions-row"];
const LIST_TARGET: &str = "_list";
const SEPARATOR: &str = " > ";

/// One step of a breadcrumb chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbEntry {
    /// Display title (breadcrumb override or title)
    pub title: String,
    /// Route of the scenario, if it has one
    pub route: Option<String>,
}

impl BreadcrumbEntry {
    /// Entry for a scenario that has a `title` or `breadcrumb`
    #[must_use]
    pub fn for_scenario(scenario: &Map<String, Value>) -> Option<Self> {
        let title = text_field(scenario, "breadcrumb").or_else(|| text_field(scenario, "title"))?;
        Some(Self {
            title,
            route: text_field(scenario, "route"),
        })
    }

    /// JSON form: `{title}` or `{title, route}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("title".to_string(), Value::String(self.title.clone()));
        if let Some(route) = &self.route {
            entry.insert("route".to_string(), Value::String(route.clone()));
        }
        Value::Object(entry)
    }
}

/// Breadcrumb block attached to a scenario as `breadcrumbs: [Breadcrumbs]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumbs {
    /// Root-to-leaf entries
    pub to_array: Vec<BreadcrumbEntry>,
    /// Titles joined with `" > "`
    pub to_string: String,
}

impl Breadcrumbs {
    /// JSON form: `{to_array, to_string}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "to_array": self.to_array.iter().map(BreadcrumbEntry::to_value).collect::<Vec<_>>(),
            "to_string": self.to_string,
        })
    }

    /// Build from a root-to-leaf chain
    #[must_use]
    pub fn from_chain(to_array: Vec<BreadcrumbEntry>) -> Self {
        let to_string = to_array
            .iter()
            .map(|entry| entry.title.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        Self {
            to_array,
            to_string,
        }
    }
}

/// Incoming goto edges, in document order
///
/// Maps a lowercased target key to every scenario linking to it, in the
/// order those scenarios appear. Only scenarios with a `title` or
/// `breadcrumb` can be parents.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<String, Vec<String>>,
}

impl ParentIndex {
    /// Index every goto edge of `scenarios`
    #[must_use]
    pub fn build(scenarios: &Map<String, Value>) -> Self {
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();

        for (key, scenario) in scenarios {
            let Some(scenario) = scenario.as_object() else {
                continue;
            };
            if !scenario.contains_key("title") && !scenario.contains_key("breadcrumb") {
                continue;
            }
            for target in goto_targets(scenario) {
                let linked = parents.entry(target).or_default();
                if !linked.iter().any(|p| p == key) {
                    linked.push(key.clone());
                }
            }
        }

        Self { parents }
    }

    /// First scenario, other than `key` itself, linking to `key`
    #[must_use]
    pub fn parent_of(&self, key: &str) -> Option<&str> {
        self.parents
            .get(&key.to_lowercase())?
            .iter()
            .map(String::as_str)
            .find(|parent| *parent != key)
    }
}

/// Lowercased goto targets of one scenario's top and row actions
fn goto_targets(scenario: &Map<String, Value>) -> Vec<String> {
    let Some(options) = scenario.get("options").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut targets = Vec::new();
    for group in ACTION_GROUPS {
        let Some(items) = options
            .get(group)
            .and_then(|g| g.get("items"))
            .and_then(Value::as_array)
        else {
            continue;
        };

        for item in items.iter().filter_map(Value::as_object) {
            let Some(goto) = text_field(item, "goto-scenario") else {
                continue;
            };
            let goto = goto.to_lowercase();
            if goto == LIST_TARGET {
                if let Some(list) = item.get("list-scenario").and_then(Value::as_array) {
                    targets.extend(
                        list.iter()
                            .filter_map(scenario_document::text)
                            .map(|t| t.to_lowercase()),
                    );
                }
            }
            targets.push(goto);
        }
    }
    targets
}

/// Attaches breadcrumb chains to scenarios
#[derive(Debug, Clone, Copy)]
pub struct BreadcrumbGenerator {
    max_depth: usize,
}

impl Default for BreadcrumbGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BREADCRUMB_DEPTH)
    }
}

impl BreadcrumbGenerator {
    /// Create generator with a recursion guard
    #[inline]
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Attach `breadcrumbs` to every scenario with a valid chain
    ///
    /// Documents without a `scenarios` map are returned unchanged.
    #[must_use]
    pub fn add_breadcrumbs(&self, mut document: Value) -> Value {
        let Some(scenarios) = document.get_mut("scenarios").and_then(Value::as_object_mut) else {
            return document;
        };

        let chains = self.chains(scenarios);

        for (key, chain) in chains {
            let Some(scenario) = scenarios.get_mut(&key).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(breadcrumbs) = attachable(scenario, &key, chain) {
                tracing::debug!(
                    "Added breadcrumb to scenario '{}': {}",
                    key,
                    breadcrumbs.to_string
                );
                scenario.insert(
                    "breadcrumbs".to_string(),
                    Value::Array(vec![breadcrumbs.to_value()]),
                );
            }
        }

        document
    }

    /// Leaf-to-root chain of every scenario, in document order
    #[must_use]
    pub fn chains(&self, scenarios: &Map<String, Value>) -> Vec<(String, Vec<BreadcrumbEntry>)> {
        let index = ParentIndex::build(scenarios);
        scenarios
            .keys()
            .map(|key| (key.clone(), self.generate(key, scenarios, &index, 0)))
            .collect()
    }

    /// Leaf-to-root chain for one scenario
    ///
    /// Starts with the scenario's own entry, followed by its first parent
    /// and that parent's ancestors. The parent's own entry appears once: its
    /// recursive chain is appended without its first element. Empty when the
    /// scenario has no title or the depth guard trips.
    #[must_use]
    pub fn generate(
        &self,
        key: &str,
        scenarios: &Map<String, Value>,
        index: &ParentIndex,
        depth: usize,
    ) -> Vec<BreadcrumbEntry> {
        if depth > self.max_depth {
            tracing::warn!(
                "Breadcrumb recursion limit ({}) exceeded while resolving scenario '{}'",
                self.max_depth,
                key
            );
            return Vec::new();
        }

        let Some(scenario) = scenarios.get(key).and_then(Value::as_object) else {
            return Vec::new();
        };
        if !scenario.contains_key("title") {
            return Vec::new();
        }
        let Some(own) = BreadcrumbEntry::for_scenario(scenario) else {
            return Vec::new();
        };

        let mut chain = vec![own];

        let parent = index.parent_of(key).and_then(|parent_key| {
            let entry = scenarios
                .get(parent_key)
                .and_then(Value::as_object)
                .and_then(BreadcrumbEntry::for_scenario)?;
            Some((parent_key, entry))
        });

        if let Some((parent_key, entry)) = parent {
            chain.push(entry);
            let ancestors = self.generate(parent_key, scenarios, index, depth + 1);
            chain.extend(ancestors.into_iter().skip(1));
        }

        chain
    }
}

/// Root-to-leaf block for a scenario, if its chain starts with itself
fn attachable(
    scenario: &Map<String, Value>,
    key: &str,
    mut chain: Vec<BreadcrumbEntry>,
) -> Option<Breadcrumbs> {
    let first = chain.first()?;
    let title = text_field(scenario, "title").unwrap_or_else(|| key.to_string());
    let breadcrumb_title = text_field(scenario, "breadcrumb").unwrap_or_else(|| title.clone());
    if first.title != title && first.title != breadcrumb_title {
        return None;
    }

    chain.reverse();
    Some(Breadcrumbs::from_chain(chain))
}

/// Attach breadcrumbs with the default depth guard
#[must_use]
pub fn add_breadcrumbs(document: Value) -> Value {
    BreadcrumbGenerator::default().add_breadcrumbs(document)
}
