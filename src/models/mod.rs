//! Wire models for the ONTAP REST API.
//!
//! Every optional field is an `Option` that is omitted from outbound JSON
//! when `None`, so a PATCH never clears settings the caller did not mention.

pub mod qtree;
pub mod svm;

use serde::{Deserialize, Serialize};

pub use qtree::{Qtree, QtreeRecord};
pub use svm::Svm;

/// Reference to a related object, e.g. `{"uuid": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// UUID of the referenced object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Name of the referenced object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectRef {
    /// Reference by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            name: None,
        }
    }

    /// Reference by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            uuid: None,
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_ref_omits_absent_fields() {
        let value = serde_json::to_value(ObjectRef::by_uuid("V1")).unwrap();
        assert_eq!(value, json!({"uuid": "V1"}));

        let value = serde_json::to_value(ObjectRef::by_name("Default")).unwrap();
        assert_eq!(value, json!({"name": "Default"}));
    }
}
