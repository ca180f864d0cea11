//! Test support: a scripted transport and a provider test harness.
//!
//! [`MockTransport`] replays queued responses in order and records every
//! request, so the job protocol and the mappers can be exercised without a
//! cluster. [`ProviderTester`] drives a [`ProviderService`] through the same
//! calls a host would make.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ontap_provider::testing::{MockTransport, ProviderTester};
//! use ontap_provider::OntapProvider;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = Arc::new(MockTransport::new());
//! mock.respond(200, json!({"uuid": "S1", "name": "svm1", "state": "running"}));
//!
//! let tester = ProviderTester::new(OntapProvider::new().with_transport(mock.clone()));
//! tester
//!     .configure(json!({"hostname": "cluster1", "username": "admin", "password": "pw"}))
//!     .await
//!     .unwrap();
//!
//! let state = tester.read("ontap_svm", json!({"uuid": "S1"})).await.unwrap();
//! assert_eq!(state["state"], "running");
//! assert!(mock.requests()[0].url.ends_with("/api/svm/svms/S1"));
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::{ApiRequest, ApiResponse, ClientConfig, OntapClient, Transport};
use crate::error::{ClientError, ProviderError};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};

// =========================================================================
// Scripted transport
// =========================================================================

#[derive(Debug)]
enum Scripted {
    Response(ApiResponse),
    Failure(String),
}

/// A [`Transport`] that answers from a queue of scripted responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(entry);
    }

    /// Queue a JSON response.
    pub fn respond(&self, status: u16, body: Value) {
        self.push(Scripted::Response(ApiResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    /// Queue a response with a non-JSON body.
    pub fn respond_raw(&self, status: u16, body: &str) {
        self.push(Scripted::Response(ApiResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    /// Queue a `202 Accepted` pointing at the job at `href`.
    pub fn accepted(&self, href: &str) {
        let uuid = href.rsplit('/').next().unwrap_or_default();
        self.respond(
            202,
            json!({"job": {"uuid": uuid, "_links": {"self": {"href": href}}}}),
        );
    }

    /// Queue a job-status poll result.
    pub fn job(&self, state: &str, message: Option<&str>) {
        let mut body = json!({"state": state});
        if let Some(message) = message {
            body["message"] = json!(message);
        }
        self.respond(200, body);
    }

    /// Queue a transport failure (no HTTP response at all).
    pub fn fail(&self, message: &str) {
        self.push(Scripted::Failure(message.to_string()));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let description = format!("{} {}", request.method, request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(ClientError::Transport(message.into())),
            None => Err(ClientError::Transport(
                format!("no scripted response for {}", description).into(),
            )),
        }
    }
}

/// A client for `https://cluster1.example.com` as `admin`, polling every
/// 10ms, backed by `transport`.
pub fn mock_client(transport: Arc<MockTransport>) -> OntapClient {
    let config = ClientConfig::new("cluster1.example.com", "admin", "netapp1!")
        .with_poll_interval(Duration::from_millis(10));
    OntapClient::with_transport(config, transport)
}

// =========================================================================
// Provider harness
// =========================================================================

/// Drives a [`ProviderService`] the way a host would.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Wrap a provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration, failing on any error diagnostic.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a create.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan an update from `prior_state` to `config`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), config.clone(), config)
            .await
    }

    /// Plan a destroy.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned).await
    }

    /// Read a resource.
    pub async fn read(&self, resource_type: &str, current: Value) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current).await
    }

    /// Update a resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.update(resource_type, prior, planned).await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current).await
    }

    /// Import a resource by id.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read_data_source(data_source_type, config).await
    }

    /// plan → create → read. Returns the state after the read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// plan → update → read. Returns the state after the read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// create → update → delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone())
            .await?;
        Ok(updated)
    }
}

/// Failure of a harness call.
#[derive(Debug, Error)]
pub enum TestError {
    /// The call returned error diagnostics.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The call returned an error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("{} error diagnostic(s):", diagnostics.len());
    for diag in diagnostics {
        out.push_str(&format!("\n  {}", diag.summary));
        if let Some(detail) = &diag.detail {
            out.push_str(&format!(": {}", detail));
        }
        if let Some(attribute) = &diag.attribute {
            out.push_str(&format!(" (at {})", attribute));
        }
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion helpers
// =========================================================================

/// Assert that a plan changes something in place.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan requires replacement.
///
/// # Panics
///
/// Panics if the plan can be applied in place.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan changes nothing.
///
/// # Panics
///
/// Panics if the plan has any change.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        !plan.has_changes(),
        "Expected no changes, got: {:?}",
        plan.changed_paths()
    );
}

/// Assert that a plan touches `path`.
///
/// # Panics
///
/// Panics if no change is planned for `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let changed = plan.changed_paths();
    assert!(
        changed.contains(&path),
        "Expected a change to '{}', changed: {:?}",
        path,
        changed
    );
}

/// Assert that no diagnostic is an error.
///
/// # Panics
///
/// Panics on the first error diagnostic.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got: {:?}",
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that some error diagnostic's summary contains `substring`.
///
/// # Panics
///
/// Panics if none does.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "Expected an error containing '{}', got: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}
