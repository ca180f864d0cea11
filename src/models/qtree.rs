//! Qtree models.
//!
//! [`Qtree`] is the flat shape callers work with; [`QtreeRecord`] is what
//! `/api/storage/qtrees` sends and receives, with the owning SVM and volume
//! as nested reference objects.

use serde::{Deserialize, Serialize};

use super::ObjectRef;
use crate::error::ClientError;

/// A qtree as seen by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qtree {
    /// Composite identity `<volume uuid>/<qtree id>`.
    pub uuid: Option<String>,
    /// Numeric qtree id within its volume.
    pub id: Option<i64>,
    /// Qtree name, unique within its volume.
    pub name: String,
    /// Owning SVM.
    pub svm_uuid: String,
    /// Containing volume.
    pub volume_uuid: String,
    /// Junction path, e.g. `/vol1/q1`.
    pub path: Option<String>,
    /// `unix`, `ntfs`, `mixed`.
    pub security_style: Option<String>,
    /// Permission bits, e.g. `755`.
    pub unix_permissions: Option<i64>,
}

impl Qtree {
    /// The identity, or [`ClientError::MissingField`] if the qtree was never read.
    pub fn require_uuid(&self) -> Result<&str, ClientError> {
        self.uuid
            .as_deref()
            .filter(|uuid| !uuid.is_empty())
            .ok_or(ClientError::MissingField("uuid"))
    }
}

/// Body of `/api/storage/qtrees` requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QtreeRecord {
    /// Owning SVM reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svm: Option<ObjectRef>,
    /// Containing volume reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<ObjectRef>,
    /// Qtree name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Numeric id, assigned by ONTAP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Junction path. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// `unix`, `ntfs`, `mixed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_style: Option<String>,
    /// Permission bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unix_permissions: Option<i64>,
}

impl QtreeRecord {
    /// POST body: parent UUIDs become reference objects, server-assigned
    /// fields are left out.
    pub fn for_create(qtree: &Qtree) -> Result<Self, ClientError> {
        if qtree.name.is_empty() {
            return Err(ClientError::MissingField("name"));
        }
        if qtree.svm_uuid.is_empty() {
            return Err(ClientError::MissingField("svm_uuid"));
        }
        if qtree.volume_uuid.is_empty() {
            return Err(ClientError::MissingField("volume_uuid"));
        }
        Ok(Self {
            svm: Some(ObjectRef::by_uuid(&qtree.svm_uuid)),
            volume: Some(ObjectRef::by_uuid(&qtree.volume_uuid)),
            name: Some(qtree.name.clone()),
            security_style: qtree.security_style.clone(),
            unix_permissions: qtree.unix_permissions,
            ..Self::default()
        })
    }

    /// PATCH body: only the fields ONTAP allows to change in place.
    pub fn for_patch(qtree: &Qtree) -> Self {
        Self {
            name: Some(qtree.name.clone()).filter(|n| !n.is_empty()),
            security_style: qtree.security_style.clone(),
            unix_permissions: qtree.unix_permissions,
            ..Self::default()
        }
    }

    /// Flatten into a [`Qtree`] carrying the identity it was fetched by.
    pub fn into_qtree(self, uuid: impl Into<String>) -> Qtree {
        let parent = |r: Option<ObjectRef>| r.and_then(|r| r.uuid).unwrap_or_default();
        Qtree {
            uuid: Some(uuid.into()),
            id: self.id,
            name: self.name.unwrap_or_default(),
            svm_uuid: parent(self.svm),
            volume_uuid: parent(self.volume),
            path: self.path,
            security_style: self.security_style,
            unix_permissions: self.unix_permissions,
        }
    }
}

/// Compose the qtree identity from its volume and numeric id.
pub fn composite_id(volume_uuid: &str, id: i64) -> String {
    format!("{}/{}", volume_uuid, id)
}

/// Split a `<volume uuid>/<id>` identity.
pub fn split_composite_id(uuid: &str) -> Option<(&str, i64)> {
    let (volume, id) = uuid.split_once('/')?;
    if volume.is_empty() {
        return None;
    }
    Some((volume, id.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Qtree {
        Qtree {
            uuid: Some("V1/42".into()),
            id: Some(42),
            name: "q1".into(),
            svm_uuid: "S1".into(),
            volume_uuid: "V1".into(),
            path: Some("/vol1/q1".into()),
            security_style: None,
            unix_permissions: None,
        }
    }

    #[test]
    fn test_create_body_uses_references_and_omits_unset() {
        let body = serde_json::to_value(QtreeRecord::for_create(&sample()).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "svm": {"uuid": "S1"},
                "volume": {"uuid": "V1"},
                "name": "q1"
            })
        );
    }

    #[test]
    fn test_create_requires_parents() {
        let mut qtree = sample();
        qtree.volume_uuid.clear();
        assert!(matches!(
            QtreeRecord::for_create(&qtree),
            Err(ClientError::MissingField("volume_uuid"))
        ));
    }

    #[test]
    fn test_patch_body_has_no_identity() {
        let mut qtree = sample();
        qtree.unix_permissions = Some(750);
        let body = serde_json::to_value(QtreeRecord::for_patch(&qtree)).unwrap();
        assert_eq!(body, json!({"name": "q1", "unix_permissions": 750}));
    }

    #[test]
    fn test_into_qtree_flattens_references() {
        let record: QtreeRecord = serde_json::from_value(json!({
            "svm": {"uuid": "S1", "name": "svm1"},
            "volume": {"uuid": "V1", "name": "vol1"},
            "id": 42,
            "name": "q1",
            "path": "/vol1/q1",
            "security_style": "unix",
            "unix_permissions": 755
        }))
        .unwrap();

        let qtree = record.into_qtree("V1/42");
        assert_eq!(qtree.uuid.as_deref(), Some("V1/42"));
        assert_eq!(qtree.svm_uuid, "S1");
        assert_eq!(qtree.volume_uuid, "V1");
        assert_eq!(qtree.security_style.as_deref(), Some("unix"));
        assert_eq!(qtree.unix_permissions, Some(755));
    }

    #[test]
    fn test_composite_id() {
        assert_eq!(composite_id("V1", 42), "V1/42");
        assert_eq!(split_composite_id("V1/42"), Some(("V1", 42)));
        assert_eq!(split_composite_id("V1"), None);
        assert_eq!(split_composite_id("/42"), None);
        assert_eq!(split_composite_id("V1/x"), None);
    }
}
