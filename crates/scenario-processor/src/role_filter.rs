//! Role authorization filter
//!
//! Walks a document depth-first and rebuilds it without the objects the
//! caller may not see. Each object is judged before its children, so a
//! removed subtree is never visited.
//!
//! An object is removed when the first of these holds:
//! 1. it carries `role`/`roles` and the caller is not authorized
//! 2. `backend` is set
//! 3. `only-not-logged` is set and the caller is logged in
//! 4. maintenance is on and `hide_in_maintenance` is set
//! 5. maintenance is off and `show_in_maintenance` is set
//!
//! Survivors with `table_join.field_alias` and `data` get `data` replaced by
//! the alias. Children keyed `search_enum` are kept verbatim.

use crate::role::Role;
use scenario_document::{flag, get_path, text};
use serde_json::{Map, Value};

const SEARCH_ENUM: &str = "search_enum";

/// Why an object was pruned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Caller role not listed
    Unauthorized,
    /// Backend-only node
    Backend,
    /// Only visible to logged-out callers
    OnlyNotLogged,
    /// Hidden during maintenance
    HiddenInMaintenance,
    /// Only visible during maintenance
    MaintenanceOnly,
}

/// Caller-specific pruning of a document tree
#[derive(Debug, Clone)]
pub struct RoleFilter {
    role: Role,
    maintenance: bool,
}

impl RoleFilter {
    /// Create filter for a caller
    #[inline]
    #[must_use]
    pub fn new(role: Role, maintenance: bool) -> Self {
        Self { role, maintenance }
    }

    /// Filter a document, returning a new tree
    ///
    /// The root itself is never removed; only its descendants are judged.
    #[must_use]
    pub fn apply(&self, document: &Value) -> Value {
        tracing::debug!(
            "Filtering by role: {}, maintenance: {}",
            self.role,
            self.maintenance
        );
        self.filter_value(document)
    }

    /// Removal decision for one object, `None` keeps it
    #[must_use]
    pub fn removal(&self, node: &Map<String, Value>) -> Option<Removal> {
        if (node.contains_key("role") || node.contains_key("roles"))
            && !is_role_authorized(node, &self.role)
        {
            return Some(Removal::Unauthorized);
        }
        if flag(node, "backend") {
            return Some(Removal::Backend);
        }
        if flag(node, "only-not-logged") && self.role.is_logged_in() {
            return Some(Removal::OnlyNotLogged);
        }
        if self.maintenance && flag(node, "hide_in_maintenance") {
            return Some(Removal::HiddenInMaintenance);
        }
        if !self.maintenance && flag(node, "show_in_maintenance") {
            return Some(Removal::MaintenanceOnly);
        }
        None
    }

    fn filter_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.filter_object(map)),
            Value::Array(items) => Value::Array(self.filter_array(items)),
            scalar => scalar.clone(),
        }
    }

    fn filter_object(&self, node: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::with_capacity(node.len());
        for (key, child) in node {
            match child {
                Value::Object(obj) => {
                    if let Some(reason) = self.removal(obj) {
                        tracing::trace!("removing '{}': {:?}", key, reason);
                        continue;
                    }
                    let kept = if key == SEARCH_ENUM {
                        with_field_alias(obj.clone())
                    } else {
                        self.filter_object(&with_field_alias(obj.clone()))
                    };
                    out.insert(key.clone(), Value::Object(kept));
                }
                Value::Array(_) if key == SEARCH_ENUM => {
                    out.insert(key.clone(), child.clone());
                }
                other => {
                    out.insert(key.clone(), self.filter_value(other));
                }
            }
        }
        out
    }

    fn filter_array(&self, items: &[Value]) -> Vec<Value> {
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => match self.removal(obj) {
                    Some(reason) => {
                        tracing::trace!("removing array element: {:?}", reason);
                        None
                    }
                    None => Some(Value::Object(
                        self.filter_object(&with_field_alias(obj.clone())),
                    )),
                },
                other => Some(self.filter_value(other)),
            })
            .collect()
    }
}

/// Filter a document for a caller, see [`RoleFilter`]
#[must_use]
pub fn filter_by_role(document: &Value, role: &Role, maintenance: bool) -> Value {
    RoleFilter::new(role.clone(), maintenance).apply(document)
}

/// Check the `role` (or, if absent, `roles`) field of a node against a caller
///
/// A list authorizes when any entry does. An entry authorizes when it is
/// `"*"` and the caller is logged in, equals the caller role, is `"!"` and
/// the caller is anonymous, or is `"@"` and the caller is exactly `"@"`.
/// Absent fields authorize everyone.
#[must_use]
pub fn is_role_authorized(node: &Map<String, Value>, role: &Role) -> bool {
    let Some(allowed) = node.get("role").or_else(|| node.get("roles")) else {
        return true;
    };

    match allowed {
        Value::Array(entries) => entries
            .iter()
            .any(|entry| text(entry).is_some_and(|e| entry_authorizes(&e, role))),
        single => text(single).is_some_and(|e| entry_authorizes(&e, role)),
    }
}

fn entry_authorizes(allowed: &str, role: &Role) -> bool {
    match allowed {
        "*" => role.is_logged_in(),
        "!" => !role.is_logged_in(),
        Role::UNVALIDATED => role.is_unvalidated(),
        literal => role.as_str() == Some(literal),
    }
}

fn with_field_alias(mut node: Map<String, Value>) -> Map<String, Value> {
    if !node.contains_key("data") {
        return node;
    }
    let alias = node
        .get("table_join")
        .and_then(|join| get_path(join, "field_alias"))
        .and_then(text);
    if let Some(alias) = alias {
        node.insert("data".to_string(), Value::String(alias));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn absent_role_field_authorizes() {
        let node = json!({"title": "Home"});
        assert!(is_role_authorized(obj(&node), &Role::anonymous()));
    }

    #[test]
    fn wildcard_requires_login() {
        let node = json!({"role": "*"});
        assert!(is_role_authorized(obj(&node), &Role::named("admin")));
        assert!(!is_role_authorized(obj(&node), &Role::anonymous()));
        assert!(!is_role_authorized(obj(&node), &Role::named("")));
    }

    #[test]
    fn bang_requires_anonymous() {
        let node = json!({"role": "!"});
        assert!(is_role_authorized(obj(&node), &Role::anonymous()));
        assert!(is_role_authorized(obj(&node), &Role::named("")));
        assert!(!is_role_authorized(obj(&node), &Role::named("admin")));
    }

    #[test]
    fn at_requires_exact_sentinel() {
        let node = json!({"roles": ["@"]});
        assert!(is_role_authorized(obj(&node), &Role::unvalidated()));
        assert!(!is_role_authorized(obj(&node), &Role::named("admin")));
        assert!(!is_role_authorized(obj(&node), &Role::anonymous()));
    }

    #[test]
    fn list_matches_any_entry() {
        let node = json!({"roles": ["operator", "admin"]});
        assert!(is_role_authorized(obj(&node), &Role::named("admin")));
        assert!(!is_role_authorized(obj(&node), &Role::named("guest")));
    }

    #[test]
    fn role_takes_precedence_over_roles() {
        let node = json!({"role": "admin", "roles": ["guest"]});
        assert!(!is_role_authorized(obj(&node), &Role::named("guest")));
    }

    #[test]
    fn malformed_role_field_denies() {
        let node = json!({"roles": {"admin": true}});
        assert!(!is_role_authorized(obj(&node), &Role::named("admin")));
    }

    #[test]
    fn removal_order_is_first_match() {
        let filter = RoleFilter::new(Role::named("admin"), true);
        let node = json!({"role": "guest", "backend": true, "hide_in_maintenance": true});
        assert_eq!(filter.removal(obj(&node)), Some(Removal::Unauthorized));

        let node = json!({"backend": true, "only-not-logged": true});
        assert_eq!(filter.removal(obj(&node)), Some(Removal::Backend));

        let node = json!({"only-not-logged": true, "hide_in_maintenance": true});
        assert_eq!(filter.removal(obj(&node)), Some(Removal::OnlyNotLogged));
    }

    #[test]
    fn maintenance_visibility() {
        let hide = json!({"hide_in_maintenance": true});
        let show = json!({"show_in_maintenance": true});
        let plain = json!({"title": "x"});

        let on = RoleFilter::new(Role::anonymous(), true);
        let off = RoleFilter::new(Role::anonymous(), false);

        assert_eq!(on.removal(obj(&hide)), Some(Removal::HiddenInMaintenance));
        assert_eq!(on.removal(obj(&show)), None);
        assert_eq!(off.removal(obj(&show)), Some(Removal::MaintenanceOnly));
        assert_eq!(off.removal(obj(&hide)), None);
        assert_eq!(on.removal(obj(&plain)), None);
        assert_eq!(off.removal(obj(&plain)), None);
    }

    #[test]
    fn prunes_nested_objects_and_array_elements() {
        let doc = json!({
            "scenarios": {
                "home": {"title": "Home"},
                "admin": {"title": "Admin", "roles": ["admin"]},
                "people": {
                    "title": "People",
                    "options": {
                        "actions-row": {"items": [
                            {"code": "edit", "roles": ["admin"]},
                            {"code": "view"},
                            {"code": "purge", "backend": true}
                        ]}
                    }
                }
            }
        });

        let filtered = filter_by_role(&doc, &Role::named("operator"), false);

        assert_eq!(
            filtered,
            json!({
                "scenarios": {
                    "home": {"title": "Home"},
                    "people": {
                        "title": "People",
                        "options": {
                            "actions-row": {"items": [{"code": "view"}]}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn input_is_untouched() {
        let doc = json!({"a": {"backend": true}, "b": {"title": "kept"}});
        let before = doc.clone();
        let _ = filter_by_role(&doc, &Role::anonymous(), false);
        assert_eq!(doc, before);
    }

    #[test]
    fn root_is_never_removed() {
        let doc = json!({"backend": true, "child": {"title": "x"}});
        let filtered = filter_by_role(&doc, &Role::anonymous(), false);
        assert_eq!(filtered, doc);
    }

    #[test]
    fn search_enum_preserved_verbatim() {
        let doc = json!({
            "field": {
                "search_enum": {"secret": {"backend": true}, "open": {"title": "x"}}
            },
            "other": {
                "search_enum": [{"backend": true}]
            }
        });

        let filtered = filter_by_role(&doc, &Role::anonymous(), false);
        assert_eq!(filtered, doc);
    }

    #[test]
    fn search_enum_itself_is_still_judged() {
        let doc = json!({"field": {"search_enum": {"backend": true, "values": []}}});
        let filtered = filter_by_role(&doc, &Role::anonymous(), false);
        assert_eq!(filtered, json!({"field": {}}));
    }

    #[test]
    fn field_alias_rewrites_data() {
        let doc = json!({
            "columns": [
                {"data": "person_id", "table_join": {"field_alias": "person_name"}},
                {"data": "email"}
            ],
            "detail": {"data": "city_id", "table_join": {"field_alias": "city"}},
            "orphan": {"table_join": {"field_alias": "unused"}}
        });

        let filtered = filter_by_role(&doc, &Role::anonymous(), false);

        assert_eq!(filtered["columns"][0]["data"], "person_name");
        assert_eq!(filtered["columns"][1]["data"], "email");
        assert_eq!(filtered["detail"]["data"], "city");
        assert!(filtered["orphan"].get("data").is_none());
    }

    #[test]
    fn scalars_in_arrays_survive() {
        let doc = json!({"tags": ["a", 1, null, ["nested", {"backend": true}]]});
        let filtered = filter_by_role(&doc, &Role::anonymous(), false);
        assert_eq!(filtered, json!({"tags": ["a", 1, null, ["nested"]]}));
    }

    #[test]
    fn survivor_order_is_stable() {
        let doc = json!({"items": [
            {"id": 1}, {"id": 2, "backend": true}, {"id": 3}, {"id": 4, "role": "!"}, {"id": 5}
        ]});
        let filtered = filter_by_role(&doc, &Role::named("admin"), false);
        let ids: Vec<_> = filtered["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, [1, 3, 5]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn caller() -> impl Strategy<Value = Role> {
            prop_oneof![
                Just(Role::anonymous()),
                Just(Role::named("")),
                Just(Role::unvalidated()),
                "[a-z]{1,6}".prop_map(Role::named),
            ]
        }

        proptest! {
            #[test]
            fn wildcard_kept_iff_logged_in(role in caller(), maintenance in any::<bool>()) {
                let doc = json!({"node": {"role": ["*"], "title": "x"}});
                let filtered = filter_by_role(&doc, &role, maintenance);
                prop_assert_eq!(filtered.get("node").is_some(), role.is_logged_in());
            }

            #[test]
            fn refiltering_is_stable(role in caller(), maintenance in any::<bool>()) {
                let doc = json!({
                    "a": {"roles": ["admin", "!"], "b": {"backend": true}},
                    "c": [{"show_in_maintenance": true}, {"hide_in_maintenance": true}, {"only-not-logged": true}],
                    "d": {"title": "plain", "e": {"role": "@"}}
                });
                let once = filter_by_role(&doc, &role, maintenance);
                let twice = filter_by_role(&once, &role, maintenance);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
