//! SVM operations on `/api/svm/svms`.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{single, OntapClient, Records};
use crate::error::ClientError;
use crate::models::Svm;

const SVMS: &str = "/api/svm/svms";

#[derive(Debug, Deserialize)]
struct SvmUuid {
    uuid: String,
}

impl OntapClient {
    /// Create an SVM and read it back by name.
    #[instrument(skip(self, svm), fields(name = ?svm.name))]
    pub async fn create_svm(&self, svm: &Svm) -> Result<Svm, ClientError> {
        let name = svm
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(ClientError::MissingField("name"))?;
        let body = serde_json::to_value(Svm {
            uuid: None,
            ..svm.clone()
        })?;
        self.execute(Method::POST, &format!("{}?return_records=true", SVMS), Some(body))
            .await?;

        let created = self.find_svm_by_name(name).await?;
        info!(uuid = ?created.uuid, "svm created");
        Ok(created)
    }

    /// Look an SVM up by name and read it.
    #[instrument(skip(self))]
    pub async fn find_svm_by_name(&self, name: &str) -> Result<Svm, ClientError> {
        let path = format!("{}?name={}", SVMS, urlencoding::encode(name));
        let found: Records<SvmUuid> = self.get_json(&path).await?;
        let record = single(found.records, "svm", format!("name={}", name))?;
        self.get_svm(&record.uuid).await
    }

    /// Read an SVM by UUID.
    #[instrument(skip(self))]
    pub async fn get_svm(&self, uuid: &str) -> Result<Svm, ClientError> {
        let mut svm: Svm = self.get_json(&format!("{}/{}", SVMS, uuid)).await?;
        svm.uuid = Some(uuid.to_string());
        Ok(svm)
    }

    /// Modify an SVM in place, then read it back.
    #[instrument(skip(self, svm), fields(uuid = ?svm.uuid))]
    pub async fn update_svm(&self, svm: &Svm) -> Result<Svm, ClientError> {
        let uuid = svm.require_uuid()?;
        let body = serde_json::to_value(svm.for_patch())?;
        self.execute(Method::PATCH, &format!("{}/{}", SVMS, uuid), Some(body))
            .await?;
        self.get_svm(uuid).await
    }

    /// Delete an SVM. An SVM that is already gone is reported as not found.
    #[instrument(skip(self))]
    pub async fn delete_svm(&self, uuid: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, &format!("{}/{}", SVMS, uuid), None)
            .await?;
        info!("svm deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::svm::{Dns, Protocol};
    use crate::testing::{mock_client, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    const JOB: &str = "/api/cluster/jobs/J2";

    fn server_record() -> serde_json::Value {
        json!({
            "uuid": "S1",
            "name": "svm1",
            "comment": "managed",
            "language": "c.utf_8",
            "nfs": {"enabled": true},
            "fcp": {"enabled": false},
            "ipspace": {"name": "Default", "uuid": "I1"},
            "state": "running",
            "subtype": "default"
        })
    }

    #[tokio::test]
    async fn test_create_then_read_returns_supplied_fields() {
        let mock = Arc::new(MockTransport::new());
        mock.accepted(JOB);
        mock.job("success", None);
        mock.respond(200, json!({"records": [{"uuid": "S1", "name": "svm1"}], "num_records": 1}));
        mock.respond(200, server_record());
        let client = mock_client(mock.clone());

        let svm = Svm {
            name: Some("svm1".into()),
            comment: Some("managed".into()),
            language: Some("c.utf_8".into()),
            nfs: Some(Protocol::enabled(true)),
            ..Svm::default()
        };
        let created = client.create_svm(&svm).await.unwrap();

        assert_eq!(created.uuid.as_deref(), Some("S1"));
        assert_eq!(created.name, svm.name);
        assert_eq!(created.comment, svm.comment);
        assert_eq!(created.language, svm.language);
        assert_eq!(created.nfs, svm.nfs);
        assert_eq!(created.state.as_deref(), Some("running"));

        let requests = mock.requests();
        assert!(requests[0].url.ends_with("/api/svm/svms?return_records=true"));
        assert_eq!(
            requests[0].body,
            Some(json!({
                "name": "svm1",
                "comment": "managed",
                "language": "c.utf_8",
                "nfs": {"enabled": true}
            }))
        );
        assert!(requests[2].url.ends_with("/api/svm/svms?name=svm1"));
        assert!(requests[3].url.ends_with("/api/svm/svms/S1"));
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let client = mock_client(Arc::new(MockTransport::new()));
        let err = client.create_svm(&Svm::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField("name")));
    }

    #[tokio::test]
    async fn test_find_by_name_not_found() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, json!({"records": [], "num_records": 0}));
        let client = mock_client(mock);

        let err = client.find_svm_by_name("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No svm found matching name=missing");
    }

    #[tokio::test]
    async fn test_update_svm_strips_identity_and_computed_fields() {
        let mock = Arc::new(MockTransport::new());
        mock.accepted(JOB);
        mock.job("success", None);
        mock.respond(200, server_record());
        let client = mock_client(mock.clone());

        let mut svm: Svm = serde_json::from_value(server_record()).unwrap();
        svm.dns = Some(Dns {
            domains: Some(vec!["example.com".into()]),
            servers: Some(vec!["10.0.0.2".into()]),
        });
        client.update_svm(&svm).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::PATCH);
        assert!(requests[0].url.ends_with("/api/svm/svms/S1"));
        let body = requests[0].body.as_ref().unwrap();
        assert!(body.get("uuid").is_none());
        assert!(body.get("fcp").is_none());
        assert!(body.get("state").is_none());
        assert_eq!(body["dns"]["servers"], json!(["10.0.0.2"]));
    }

    #[tokio::test]
    async fn test_delete_svm_propagates_errors() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(404, json!({"error": {"code": "4", "message": "entry doesn't exist"}}));
        mock.accepted(JOB);
        mock.job("failure", Some("SVM has volumes"));
        let client = mock_client(mock);

        let err = client.delete_svm("S1").await.unwrap_err();
        assert_eq!(err.to_string(), "4: entry doesn't exist");

        let err = client.delete_svm("S1").await.unwrap_err();
        assert!(matches!(err, ClientError::JobFailed { .. }));
    }
}
