//! Attribute-level planning.
//!
//! Compares prior state with the proposed state for every attribute a schema
//! declares. Computed attributes the configuration leaves unset keep their
//! prior value, so a plan never shows ONTAP-assigned values (paths, ids,
//! UUIDs) flipping to null.

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed`.
///
/// - `prior == None`: a create, every non-null attribute is an addition.
/// - `proposed == null`: a destroy, every non-null prior attribute is removed.
/// - otherwise an update; any change to a force-new attribute marks the plan
///   as requiring replacement.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();

    let Some(prior) = prior.filter(|p| !p.is_null()) else {
        let changes = names
            .iter()
            .filter_map(|name| {
                let value = attr_value(proposed, name);
                (!value.is_null()).then(|| AttributeChange::added(name.as_str(), value))
            })
            .collect();
        return PlanResult::with_changes(proposed.clone(), changes, false);
    };

    if proposed.is_null() {
        let changes = names
            .iter()
            .filter_map(|name| {
                let value = attr_value(prior, name);
                (!value.is_null()).then(|| AttributeChange::removed(name.as_str(), value))
            })
            .collect();
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let mut planned = match proposed {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let mut changes = Vec::new();
    let mut requires_replace = false;

    for name in names {
        let attr = &schema.attributes[name];
        let before = attr_value(prior, name);
        let mut after = attr_value(proposed, name);

        if after.is_null() && attr.flags.computed {
            after = before.clone();
            planned.insert(name.clone(), after.clone());
        }

        if before == after {
            continue;
        }

        if attr.force_new {
            requires_replace = true;
        }

        changes.push(match (before.is_null(), after.is_null()) {
            (true, _) => AttributeChange::added(name.as_str(), after),
            (false, true) => AttributeChange::removed(name.as_str(), before),
            (false, false) => AttributeChange::modified(name.as_str(), before, after),
        });
    }

    PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
}

fn attr_value(state: &Value, name: &str) -> Value {
    state.get(name).cloned().unwrap_or(Value::Null)
}
