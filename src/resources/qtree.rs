//! `ontap_qtree` resource and data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode, encode, required, DataSource, Resource};
use crate::client::OntapClient;
use crate::error::ProviderError;
use crate::models::qtree::split_composite_id;
use crate::models::Qtree;
use crate::schema::{Attribute, AttributeType, Schema};

/// Resource and data source type name.
pub const TYPE_NAME: &str = "ontap_qtree";

/// State of an `ontap_qtree`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QtreeState {
    /// `<volume uuid>/<id>`.
    pub uuid: Option<String>,
    /// Numeric id within the volume.
    pub id: Option<i64>,
    /// Owning SVM.
    pub svm_uuid: Option<String>,
    /// Containing volume.
    pub volume_uuid: Option<String>,
    /// Qtree name.
    pub name: Option<String>,
    /// Junction path.
    pub path: Option<String>,
    /// `unix`, `ntfs` or `mixed`.
    pub security_style: Option<String>,
    /// Octal mode as an integer, e.g. `755`.
    pub unix_permissions: Option<i64>,
}

impl QtreeState {
    fn to_qtree(&self) -> Qtree {
        Qtree {
            uuid: self.uuid.clone(),
            id: self.id,
            name: self.name.clone().unwrap_or_default(),
            svm_uuid: self.svm_uuid.clone().unwrap_or_default(),
            volume_uuid: self.volume_uuid.clone().unwrap_or_default(),
            path: self.path.clone(),
            security_style: self.security_style.clone(),
            unix_permissions: self.unix_permissions,
        }
    }
}

impl From<Qtree> for QtreeState {
    fn from(qtree: Qtree) -> Self {
        let non_empty = |s: String| Some(s).filter(|s| !s.is_empty());
        Self {
            uuid: qtree.uuid,
            id: qtree.id,
            svm_uuid: non_empty(qtree.svm_uuid),
            volume_uuid: non_empty(qtree.volume_uuid),
            name: non_empty(qtree.name),
            path: qtree.path,
            security_style: qtree.security_style,
            unix_permissions: qtree.unix_permissions,
        }
    }
}

/// The `ontap_qtree` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct QtreeResource;

#[async_trait]
impl Resource for QtreeResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("A qtree inside an ONTAP volume")
            .with_attribute(
                "uuid",
                Attribute::optional_computed(AttributeType::String)
                    .with_description("Qtree identity, <volume uuid>/<qtree id>"),
            )
            .with_attribute("id", Attribute::computed_int64())
            .with_attribute(
                "svm_uuid",
                Attribute::required_string()
                    .with_description("UUID of the owning SVM")
                    .with_force_new(),
            )
            .with_attribute(
                "volume_uuid",
                Attribute::required_string()
                    .with_description("UUID of the containing volume")
                    .with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("path", Attribute::computed_string())
            .with_attribute(
                "security_style",
                Attribute::optional_computed(AttributeType::String)
                    .with_description("Security style: unix, ntfs or mixed"),
            )
            .with_attribute(
                "unix_permissions",
                Attribute::optional_computed(AttributeType::Int64)
                    .with_description("UNIX permission bits, e.g. 755"),
            )
    }

    async fn create(&self, client: &OntapClient, planned: Value) -> Result<Value, ProviderError> {
        let state: QtreeState = decode(planned)?;
        let created = client.create_qtree(&state.to_qtree()).await?;
        encode(&self.schema(), &QtreeState::from(created))
    }

    async fn read(&self, client: &OntapClient, current: Value) -> Result<Value, ProviderError> {
        let state: QtreeState = decode(current)?;
        let uuid = required(state.uuid, "uuid")?;
        let qtree = client.get_qtree(&uuid).await?;
        encode(&self.schema(), &QtreeState::from(qtree))
    }

    async fn update(
        &self,
        client: &OntapClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: QtreeState = decode(prior)?;
        let mut planned: QtreeState = decode(planned)?;
        planned.uuid = Some(required(prior.uuid, "uuid")?);
        let updated = client.update_qtree(&planned.to_qtree()).await?;
        encode(&self.schema(), &QtreeState::from(updated))
    }

    async fn delete(&self, client: &OntapClient, current: Value) -> Result<(), ProviderError> {
        let state: QtreeState = decode(current)?;
        let uuid = required(state.uuid, "uuid")?;
        client.delete_qtree(&uuid).await?;
        Ok(())
    }

    async fn import_state(&self, client: &OntapClient, id: &str) -> Result<Value, ProviderError> {
        if split_composite_id(id).is_none() {
            return Err(ProviderError::Validation(format!(
                "qtree import id must be <volume uuid>/<qtree id>, got '{}'",
                id
            )));
        }
        debug!(id, "importing qtree");
        let qtree = client.get_qtree(id).await?;
        encode(&self.schema(), &QtreeState::from(qtree))
    }
}

/// The `ontap_qtree` data source. Looks up by `uuid`, or by `volume_uuid`
/// and `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QtreeDataSource;

#[async_trait]
impl DataSource for QtreeDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("Look up an existing qtree")
            .with_attribute("uuid", Attribute::optional_computed(AttributeType::String))
            .with_attribute("volume_uuid", Attribute::optional_computed(AttributeType::String))
            .with_attribute("name", Attribute::optional_computed(AttributeType::String))
            .with_attribute("id", Attribute::computed_int64())
            .with_attribute("svm_uuid", Attribute::computed_string())
            .with_attribute("path", Attribute::computed_string())
            .with_attribute("security_style", Attribute::computed_string())
            .with_attribute("unix_permissions", Attribute::computed_int64())
    }

    async fn read(&self, client: &OntapClient, config: Value) -> Result<Value, ProviderError> {
        let query: QtreeState = decode(config)?;
        let qtree = match (query.uuid, query.volume_uuid, query.name) {
            (Some(uuid), _, _) => client.get_qtree(&uuid).await?,
            (None, Some(volume), Some(name)) => client.get_qtree_in_volume(&volume, &name).await?,
            _ => {
                return Err(ProviderError::Validation(
                    "either 'uuid' or both 'volume_uuid' and 'name' must be set".to_string(),
                ))
            },
        };
        encode(&self.schema(), &QtreeState::from(qtree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_client, MockTransport};
    use crate::validation::validate;
    use serde_json::json;
    use std::sync::Arc;

    fn server_record() -> Value {
        json!({
            "svm": {"uuid": "S1"},
            "volume": {"uuid": "V1"},
            "id": 42,
            "name": "q1",
            "path": "/vol1/q1",
            "security_style": "unix",
            "unix_permissions": 755
        })
    }

    #[test]
    fn test_schema_rejects_computed_path() {
        let diags = validate(
            &QtreeResource.schema(),
            &json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V1", "path": "/x"}),
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("path"));
    }

    #[tokio::test]
    async fn test_create_returns_full_state() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(201, json!({}));
        mock.respond(200, json!({"records": [{"id": 42}], "num_records": 1}));
        mock.respond(200, server_record());
        let client = mock_client(mock);

        let state = QtreeResource
            .create(
                &client,
                json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V1", "uuid": null, "path": null}),
            )
            .await
            .unwrap();

        assert_eq!(
            state,
            json!({
                "uuid": "V1/42",
                "id": 42,
                "svm_uuid": "S1",
                "volume_uuid": "V1",
                "name": "q1",
                "path": "/vol1/q1",
                "security_style": "unix",
                "unix_permissions": 755
            })
        );
    }

    #[tokio::test]
    async fn test_update_uses_prior_identity() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, json!({}));
        mock.respond(200, server_record());
        let client = mock_client(mock.clone());

        let prior = json!({"uuid": "V1/42", "name": "q0", "svm_uuid": "S1", "volume_uuid": "V1"});
        let planned = json!({"uuid": null, "name": "q1", "svm_uuid": "S1", "volume_uuid": "V1"});
        QtreeResource.update(&client, prior, planned).await.unwrap();

        let patch = &mock.requests()[0];
        assert!(patch.url.ends_with("/api/storage/qtrees/V1/42"));
        assert_eq!(patch.body, Some(json!({"name": "q1"})));
    }

    #[tokio::test]
    async fn test_delete_not_found_is_an_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(404, json!({"error": {"code": "917927", "message": "not found"}}));
        let client = mock_client(mock);

        let err = QtreeResource
            .delete(&client, json!({"uuid": "V1/42"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_import_validates_id() {
        let client = mock_client(Arc::new(MockTransport::new()));
        let err = QtreeResource.import_state(&client, "q1").await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_data_source_by_volume_and_name() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, json!({"records": [{"id": 42}], "num_records": 1}));
        mock.respond(200, server_record());
        let client = mock_client(mock);

        let state = QtreeDataSource
            .read(&client, json!({"volume_uuid": "V1", "name": "q1"}))
            .await
            .unwrap();
        assert_eq!(state["uuid"], "V1/42");
        assert_eq!(state["path"], "/vol1/q1");
    }

    #[tokio::test]
    async fn test_data_source_requires_query() {
        let client = mock_client(Arc::new(MockTransport::new()));
        let err = QtreeDataSource
            .read(&client, json!({"name": "q1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
