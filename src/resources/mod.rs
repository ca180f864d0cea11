//! Resources and data sources.
//!
//! Each type decodes JSON state into a typed model, calls the client, and
//! encodes the entity ONTAP returned back into state. Every attribute the
//! schema declares appears in encoded state, `null` when unset.

pub mod qtree;
pub mod svm;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::OntapClient;
use crate::error::ProviderError;
use crate::schema::Schema;

pub use qtree::{QtreeDataSource, QtreeResource};
pub use svm::{SvmDataSource, SvmResource};

/// A managed ONTAP object type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `ontap_qtree`.
    fn type_name(&self) -> &'static str;

    /// Declared attributes.
    fn schema(&self) -> Schema;

    /// Create the object and return its state as read back from ONTAP.
    async fn create(&self, client: &OntapClient, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh state from ONTAP.
    async fn read(&self, client: &OntapClient, current: Value) -> Result<Value, ProviderError>;

    /// Apply an in-place update and return the refreshed state.
    async fn update(
        &self,
        client: &OntapClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the object.
    async fn delete(&self, client: &OntapClient, current: Value) -> Result<(), ProviderError>;

    /// Read an existing object by its identity.
    async fn import_state(&self, client: &OntapClient, id: &str) -> Result<Value, ProviderError>;
}

/// A read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `ontap_svm`.
    fn type_name(&self) -> &'static str;

    /// Declared attributes.
    fn schema(&self) -> Schema;

    /// Look the object up using the configured arguments.
    async fn read(&self, client: &OntapClient, config: Value) -> Result<Value, ProviderError>;
}

/// All resources this crate provides.
pub fn resources() -> Vec<Arc<dyn Resource>> {
    vec![Arc::new(QtreeResource), Arc::new(SvmResource)]
}

/// All data sources this crate provides.
pub fn data_sources() -> Vec<Arc<dyn DataSource>> {
    vec![Arc::new(QtreeDataSource), Arc::new(SvmDataSource)]
}

/// Decode state into a typed model. A null state decodes from `{}`.
pub(crate) fn decode<T: DeserializeOwned>(state: Value) -> Result<T, ProviderError> {
    let state = if state.is_null() {
        Value::Object(Map::new())
    } else {
        state
    };
    Ok(serde_json::from_value(state)?)
}

/// Encode a model as state, with every schema attribute present.
pub(crate) fn encode<T: Serialize>(schema: &Schema, model: &T) -> Result<Value, ProviderError> {
    let mut map = match serde_json::to_value(model)? {
        Value::Object(map) => map,
        other => {
            return Err(ProviderError::Validation(format!(
                "state must encode to an object, got {}",
                other
            )))
        },
    };
    map.retain(|name, _| schema.attributes.contains_key(name));
    for name in schema.attributes.keys() {
        map.entry(name.clone()).or_insert(Value::Null);
    }
    Ok(Value::Object(map))
}

/// Take a required string, treating empty as missing.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, ProviderError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::Validation(format!("missing required attribute '{}'", name)))
}
