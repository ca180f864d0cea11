//! The host-facing provider interface.
//!
//! A host drives a provider through [`ProviderService`]: configure it once,
//! then validate, plan, and apply resources by type name. State crosses this
//! boundary as `serde_json::Value`; each resource decodes it into its own
//! typed model.

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};

/// Operations a host invokes on a provider.
///
/// Only configuration, planning and the four lifecycle calls are mandatory.
/// Validation hooks default to "no findings", import and data sources to
/// errors naming the unsupported type.
///
/// # Example
///
/// ```
/// use ontap_provider::{OntapProvider, ProviderService};
///
/// let provider = OntapProvider::new();
/// let metadata = provider.metadata();
/// assert!(metadata.resources.contains(&"ontap_qtree".to_string()));
/// assert!(metadata.data_sources.contains(&"ontap_svm".to_string()));
/// ```
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Provider block, resource and data source schemas.
    fn schema(&self) -> ProviderSchema;

    /// Provider type name, used as the prefix of every resource type.
    fn type_name(&self) -> &'static str;

    /// Sorted resource and data source names with the crate version.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.into_keys().collect();
        let mut data_sources: Vec<String> = schema.data_sources.into_keys().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            type_name: self.type_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            resources,
            data_sources,
        }
    }

    /// Check the provider block without connecting to the cluster.
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Build the cluster client. Must succeed before any lifecycle call.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Abort in-flight work such as job polling.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Check a resource configuration against its schema.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Diff `prior_state` against `proposed_state`. A `None` prior plans a
    /// create, a null proposal plans a delete.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create the object and return its state as read back from ONTAP.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Refresh `current_state` from ONTAP.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Apply `planned_state` in place and return the refreshed state.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the object. A missing object is an error, not a no-op.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Bring an existing object under management by its import id.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    /// Check a data source configuration against its schema.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Look up an existing object and return every attribute.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Unknown data source type: {}",
            data_source_type
        )))
    }
}
