//! Value types exchanged between the provider and its host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One attribute's transition in a plan.
///
/// `before` is `None` for attributes that only appear after a create, and
/// `after` is `None` for attributes that disappear on delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Top-level attribute name, e.g. `unix_permissions`.
    pub path: String,
    /// Value in prior state.
    pub before: Option<Value>,
    /// Value in planned state.
    pub after: Option<Value>,
}

impl AttributeChange {
    fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Set where nothing was set before.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Set before, gone afterwards.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Set before and after, to different values.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// Outcome of [`ProviderService::plan`](crate::ProviderService::plan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State expected after apply; `null` when the plan deletes.
    pub planned_state: Value,
    /// Per-attribute changes, sorted by attribute name.
    pub changes: Vec<AttributeChange>,
    /// The ONTAP object has to be deleted and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Build a plan result.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying this plan would do anything.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Names of the changed attributes, in plan order.
    pub fn changed_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }
}

/// Result of importing an existing ONTAP object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// e.g. `ontap_qtree`.
    pub resource_type: String,
    /// State as read back from ONTAP.
    pub state: Value,
}

impl ImportedResource {
    /// Pair a resource type with its imported state.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// What the provider calls itself and what it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// `ontap`.
    pub type_name: String,
    /// Crate version.
    pub version: String,
    /// Resource type names, sorted.
    pub resources: Vec<String>,
    /// Data source type names, sorted.
    pub data_sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("q1"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("q1")));

        let removed = AttributeChange::removed("comment", json!("old"));
        assert_eq!(removed.before, Some(json!("old")));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("unix_permissions", json!(755), json!(700));
        assert_eq!(modified.before, Some(json!(755)));
        assert_eq!(modified.after, Some(json!(700)));
    }

    #[test]
    fn test_plan_result() {
        let unchanged = PlanResult::with_changes(json!({"uuid": "V1/42"}), vec![], false);
        assert!(!unchanged.has_changes());
        assert!(unchanged.changed_paths().is_empty());

        let replace = PlanResult::with_changes(
            json!({"volume_uuid": "V2"}),
            vec![AttributeChange::modified("volume_uuid", json!("V1"), json!("V2"))],
            true,
        );
        assert!(replace.has_changes());
        assert!(replace.requires_replace);
        assert_eq!(replace.changed_paths(), vec!["volume_uuid"]);
    }

    #[test]
    fn test_plan_result_serializes_null_for_delete() {
        let plan = PlanResult::with_changes(
            Value::Null,
            vec![AttributeChange::removed("name", json!("q1"))],
            false,
        );
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json["planned_state"].is_null());
        assert_eq!(json["changes"][0]["before"], "q1");
        assert!(json["changes"][0]["after"].is_null());
    }
}
