//! The ONTAP provider.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::client::{OntapClient, Transport};
use crate::config::{env_lookup, ProviderConfig};
use crate::error::ProviderError;
use crate::plan::plan;
use crate::resources::{self, DataSource, Resource};
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Provider for ONTAP qtrees and SVMs.
pub struct OntapProvider {
    client: RwLock<Option<OntapClient>>,
    shutdown: CancellationToken,
    transport: Option<Arc<dyn Transport>>,
    env: EnvLookup,
    resources: HashMap<&'static str, Arc<dyn Resource>>,
    data_sources: HashMap<&'static str, Arc<dyn DataSource>>,
}

impl Default for OntapProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OntapProvider {
    /// Provider type name.
    pub const TYPE_NAME: &'static str = "ontap";

    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self {
            client: RwLock::new(None),
            shutdown: CancellationToken::new(),
            transport: None,
            env: Arc::new(env_lookup),
            resources: resources::resources()
                .into_iter()
                .map(|r| (r.type_name(), r))
                .collect(),
            data_sources: resources::data_sources()
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }

    /// Send every request through `transport` instead of a reqwest client.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Resolve unset connection settings through `lookup` instead of the
    /// process environment.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// The configured client.
    pub async fn client(&self) -> Result<OntapClient, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }

    fn resource(&self, type_name: &str) -> Result<&Arc<dyn Resource>, ProviderError> {
        self.resources
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    fn data_source(&self, type_name: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.data_sources
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for OntapProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        for (name, resource) in &self.resources {
            schema = schema.with_resource(*name, resource.schema());
        }
        for (name, data_source) in &self.data_sources {
            schema = schema.with_data_source(*name, data_source.schema());
        }
        schema
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(name = "provider.configure", skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = validate(&ProviderConfig::schema(), &config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        let config: ProviderConfig = resources::decode(config)?;
        let client_config = match config.resolve(self.env.as_ref()) {
            Ok(client_config) => client_config,
            Err(diagnostics) => return Ok(diagnostics),
        };

        let mut diagnostics = Vec::new();
        if client_config.ignore_ssl_errors {
            diagnostics.push(
                Diagnostic::warning("TLS verification disabled")
                    .with_detail("Certificates presented by the cluster are not verified")
                    .with_attribute("ignore_ssl_errors"),
            );
        }

        let host = client_config.hostname.clone();
        let client = match &self.transport {
            Some(transport) => OntapClient::with_transport(client_config, Arc::clone(transport)),
            None => OntapClient::new(client_config)?,
        }
        .with_cancellation(self.shutdown.child_token());

        *self.client.write().await = Some(client);
        info!(%host, "provider configured");
        Ok(diagnostics)
    }

    #[instrument(name = "provider.stop", skip_all)]
    async fn stop(&self) -> Result<(), ProviderError> {
        warn!("stop requested, cancelling in-flight operations");
        self.shutdown.cancel();
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.resource(resource_type)?.schema(), &config))
    }

    #[instrument(name = "provider.plan", skip(self, prior_state, proposed_state, config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        if !proposed_state.is_null() {
            let diagnostics = validate(&schema, &config);
            if let Some(first) = diagnostics.into_iter().find(Diagnostic::is_error) {
                return Err(ProviderError::Validation(match first.detail {
                    Some(detail) => format!("{}: {}", first.summary, detail),
                    None => first.summary,
                }));
            }
        }
        Ok(plan(&schema, prior_state.as_ref(), &proposed_state))
    }

    #[instrument(name = "provider.create", skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.create(&self.client().await?, planned_state).await
    }

    #[instrument(name = "provider.read", skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.read(&self.client().await?, current_state).await
    }

    #[instrument(name = "provider.update", skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource
            .update(&self.client().await?, prior_state, planned_state)
            .await
    }

    #[instrument(name = "provider.delete", skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.delete(&self.client().await?, current_state).await
    }

    #[instrument(name = "provider.import", skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let state = resource.import_state(&self.client().await?, id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.data_source(data_source_type)?.schema(), &config))
    }

    #[instrument(name = "provider.read_data_source", skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        data_source.read(&self.client().await?, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_no_errors, assert_plan_changes_attribute, assert_plan_no_changes,
        assert_plan_replaces, assert_plan_updates_in_place, MockTransport, ProviderTester,
    };
    use serde_json::json;
    use tokio_test::assert_ok;

    fn tester(mock: Arc<MockTransport>) -> ProviderTester<OntapProvider> {
        ProviderTester::new(OntapProvider::new().with_transport(mock).with_env(|_| None))
    }

    fn connection() -> Value {
        json!({
            "hostname": "cluster1.example.com",
            "username": "admin",
            "password": "netapp1!",
            "poll_interval_seconds": 1
        })
    }

    fn qtree_record(name: &str) -> Value {
        json!({
            "svm": {"uuid": "S1"},
            "volume": {"uuid": "V1"},
            "id": 42,
            "name": name,
            "path": format!("/vol1/{}", name),
            "security_style": "unix",
            "unix_permissions": 755
        })
    }

    #[test]
    fn test_metadata() {
        let metadata = OntapProvider::new().metadata();
        assert_eq!(metadata.type_name, "ontap");
        assert_eq!(metadata.resources, vec!["ontap_qtree", "ontap_svm"]);
        assert_eq!(metadata.data_sources, vec!["ontap_qtree", "ontap_svm"]);
    }

    #[tokio::test]
    async fn test_operations_require_configuration() {
        let tester = tester(Arc::new(MockTransport::new()));
        let err = tester
            .read("ontap_svm", json!({"uuid": "S1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_configure_reports_missing_credentials() {
        let tester = tester(Arc::new(MockTransport::new()));
        let err = tester
            .configure(json!({"hostname": "cluster1"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing username"));
    }

    #[tokio::test]
    async fn test_configure_uses_env_fallback() {
        let provider = OntapProvider::new()
            .with_transport(Arc::new(MockTransport::new()))
            .with_env(|name| Some(format!("from-{}", name)));
        let diagnostics = provider.configure(json!({})).await.unwrap();
        assert_no_errors(&diagnostics);

        let client = provider.client().await.unwrap();
        assert_eq!(client.base_url(), "https://from-ONTAP_HOSTNAME");
    }

    #[tokio::test]
    async fn test_configure_warns_on_insecure_tls() {
        let provider = OntapProvider::new()
            .with_transport(Arc::new(MockTransport::new()))
            .with_env(|_| None);
        let mut config = connection();
        config["ignore_ssl_errors"] = json!(true);

        let diagnostics = provider.configure(config).await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_error());
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let tester = tester(Arc::new(MockTransport::new()));
        let err = tester
            .validate_resource_config("ontap_volume", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ontap_volume"));
    }

    #[tokio::test]
    async fn test_plan_rejects_invalid_config() {
        let tester = tester(Arc::new(MockTransport::new()));
        let err = tester
            .plan_create("ontap_qtree", json!({"name": "q1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_plan_volume_change_replaces() {
        let tester = tester(Arc::new(MockTransport::new()));
        let prior = json!({"uuid": "V1/42", "name": "q1", "svm_uuid": "S1", "volume_uuid": "V1"});

        let plan = tester
            .plan_update("ontap_qtree", prior.clone(), json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V2"}))
            .await
            .unwrap();
        assert_plan_replaces(&plan);

        let plan = tester
            .plan_update("ontap_qtree", prior, json!({"name": "q2", "svm_uuid": "S1", "volume_uuid": "V1"}))
            .await
            .unwrap();
        assert_plan_updates_in_place(&plan);
        assert_plan_changes_attribute(&plan, "name");
        assert_eq!(plan.planned_state["uuid"], "V1/42");
    }

    #[tokio::test]
    async fn test_qtree_crud_lifecycle() {
        let mock = Arc::new(MockTransport::new());
        // create
        mock.accepted("/api/cluster/jobs/J1");
        mock.job("success", None);
        mock.respond(200, json!({"records": [{"id": 42}], "num_records": 1}));
        mock.respond(200, qtree_record("q1"));
        mock.respond(200, qtree_record("q1"));
        // update
        mock.accepted("/api/cluster/jobs/J2");
        mock.job("success", None);
        mock.respond(200, qtree_record("q2"));
        mock.respond(200, qtree_record("q2"));
        // delete
        mock.accepted("/api/cluster/jobs/J3");
        mock.job("success", None);

        let tester = tester(mock.clone());
        assert_ok!(tester.configure(connection()).await);

        let state = tester
            .lifecycle_crud(
                "ontap_qtree",
                json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V1"}),
                json!({"name": "q2", "svm_uuid": "S1", "volume_uuid": "V1"}),
            )
            .await
            .unwrap();

        assert_eq!(state["name"], "q2");
        assert_eq!(state["path"], "/vol1/q2");
        assert_eq!(mock.remaining(), 0);

        let requests = mock.requests();
        let patch = requests
            .iter()
            .find(|r| r.method == reqwest::Method::PATCH)
            .unwrap();
        // security_style and unix_permissions are carried from the read-back state
        assert_eq!(
            patch.body,
            Some(json!({"name": "q2", "security_style": "unix", "unix_permissions": 755}))
        );
        assert_eq!(requests.last().unwrap().method, reqwest::Method::GET);
    }

    #[tokio::test]
    async fn test_unchanged_qtree_config_plans_no_changes() {
        let mock = Arc::new(MockTransport::new());
        // create
        mock.accepted("/api/cluster/jobs/J1");
        mock.job("success", None);
        mock.respond(200, json!({"records": [{"id": 42}], "num_records": 1}));
        mock.respond(200, qtree_record("q1"));
        mock.respond(200, qtree_record("q1"));
        // update with the planned state
        mock.respond(200, json!({}));
        mock.respond(200, qtree_record("q1"));

        let tester = tester(mock.clone());
        assert_ok!(tester.configure(connection()).await);

        let config = json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V1"});
        let state = tester
            .lifecycle_create("ontap_qtree", config.clone())
            .await
            .unwrap();
        assert_eq!(state["security_style"], "unix");

        let plan = tester
            .plan_update("ontap_qtree", state.clone(), config.clone())
            .await
            .unwrap();
        assert_plan_no_changes(&plan);
        assert_eq!(plan.planned_state["security_style"], "unix");

        let updated = tester
            .update("ontap_qtree", state, plan.planned_state)
            .await
            .unwrap();
        let plan = tester
            .plan_update("ontap_qtree", updated, config)
            .await
            .unwrap();
        assert_plan_no_changes(&plan);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_import_svm() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, json!({"uuid": "S1", "name": "svm1", "state": "running"}));
        let tester = tester(mock);
        assert_ok!(tester.configure(connection()).await);

        let imported = tester.import_resource("ontap_svm", "S1").await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "ontap_svm");
        assert_eq!(imported[0].state["name"], "svm1");
    }

    #[tokio::test]
    async fn test_read_qtree_data_source() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(200, qtree_record("q1"));
        let tester = tester(mock.clone());
        assert_ok!(tester.configure(connection()).await);

        let state = tester
            .read_data_source("ontap_qtree", json!({"uuid": "V1/42"}))
            .await
            .unwrap();
        assert_eq!(state["name"], "q1");
        assert_eq!(state["svm_uuid"], "S1");
        assert!(mock.requests()[0].url.ends_with("/api/storage/qtrees/V1/42"));

        let err = tester
            .read_data_source("ontap_volume", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_stop_cancels_job_polling() {
        let mock = Arc::new(MockTransport::new());
        mock.accepted("/api/cluster/jobs/J1");
        for _ in 0..100 {
            mock.job("running", None);
        }
        let provider = Arc::new(
            OntapProvider::new()
                .with_transport(mock)
                .with_env(|_| None),
        );
        assert_no_errors(&provider.configure(connection()).await.unwrap());

        let running = Arc::clone(&provider);
        let handle = tokio::spawn(async move {
            running
                .delete("ontap_svm", json!({"uuid": "S1", "name": "svm1"}))
                .await
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        provider.stop().await.unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled(_)));
    }
}
