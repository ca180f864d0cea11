//! `ontap_svm` resource and data source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode, encode, required, DataSource, Resource};
use crate::client::OntapClient;
use crate::error::ProviderError;
use crate::models::svm::{Cifs, Dns, IpInterface, Protocol, Route};
use crate::models::{ObjectRef, Svm};
use crate::schema::{Attribute, AttributeType, Schema};

/// Resource and data source type name.
pub const TYPE_NAME: &str = "ontap_svm";

/// State of an `ontap_svm` resource.
///
/// `ip_interfaces` and `routes` are only applied when the SVM is created;
/// ONTAP does not report them on the SVM record, so they are carried over
/// from the prior state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmState {
    /// SVM UUID, also the import id.
    pub uuid: Option<String>,
    /// SVM name.
    pub name: Option<String>,
    /// Free-form description.
    pub comment: Option<String>,
    /// `default`, `dp_destination`, ...
    pub subtype: Option<String>,
    /// Default volume language.
    pub language: Option<String>,
    /// Whether NFS is enabled.
    pub nfs: Option<bool>,
    /// CIFS server settings.
    pub cifs: Option<Cifs>,
    /// DNS client settings.
    pub dns: Option<Dns>,
    /// LIFs created with the SVM.
    pub ip_interfaces: Option<Vec<IpInterface>>,
    /// IPspace name.
    pub ipspace: Option<String>,
    /// Static routes created with the SVM.
    pub routes: Option<Vec<Route>>,
    /// Operational state reported by ONTAP.
    pub state: Option<String>,
}

impl SvmState {
    fn to_create_model(&self) -> Svm {
        Svm {
            name: self.name.clone(),
            comment: self.comment.clone(),
            subtype: self.subtype.clone(),
            language: self.language.clone(),
            nfs: self.nfs.map(Protocol::enabled),
            cifs: self.cifs.clone(),
            dns: self.dns.clone(),
            ip_interfaces: self.ip_interfaces.clone(),
            ipspace: self.ipspace.clone().map(ObjectRef::by_name),
            routes: self.routes.clone(),
            ..Svm::default()
        }
    }

    fn to_patch_model(&self, uuid: String) -> Svm {
        Svm {
            uuid: Some(uuid),
            name: self.name.clone(),
            comment: self.comment.clone(),
            language: self.language.clone(),
            nfs: self.nfs.map(Protocol::enabled),
            cifs: self.cifs.clone(),
            dns: self.dns.clone(),
            ..Svm::default()
        }
    }

    /// State from a record read back from ONTAP, keeping the create-only
    /// blocks of `config`.
    fn from_svm(svm: Svm, config: &SvmState) -> Self {
        Self {
            uuid: svm.uuid,
            name: svm.name,
            comment: svm.comment.filter(|c| !c.is_empty()),
            subtype: svm.subtype,
            language: svm.language,
            nfs: svm.nfs.and_then(|p| p.enabled),
            cifs: svm.cifs,
            dns: svm.dns,
            ip_interfaces: config.ip_interfaces.clone(),
            ipspace: svm.ipspace.and_then(|i| i.name),
            routes: config.routes.clone(),
            state: svm.state,
        }
    }
}

fn cifs_type() -> AttributeType {
    AttributeType::object([
        ("name", AttributeType::String),
        ("enabled", AttributeType::Bool),
        (
            "ad_domain",
            AttributeType::object([
                ("fqdn", AttributeType::String),
                ("organizational_unit", AttributeType::String),
            ]),
        ),
    ])
}

fn dns_type() -> AttributeType {
    AttributeType::object([
        ("domains", AttributeType::string_list()),
        ("servers", AttributeType::string_list()),
    ])
}

fn ip_interfaces_type() -> AttributeType {
    AttributeType::list(AttributeType::object([
        ("name", AttributeType::String),
        ("uuid", AttributeType::String),
        (
            "ip",
            AttributeType::object([
                ("address", AttributeType::String),
                ("netmask", AttributeType::String),
            ]),
        ),
        ("service_policy", AttributeType::String),
        ("services", AttributeType::string_list()),
    ]))
}

fn routes_type() -> AttributeType {
    AttributeType::list(AttributeType::object([
        (
            "destination",
            AttributeType::object([
                ("address", AttributeType::String),
                ("family", AttributeType::String),
                ("netmask", AttributeType::String),
            ]),
        ),
        ("gateway", AttributeType::String),
    ]))
}

fn enabled_type() -> AttributeType {
    AttributeType::object([("enabled", AttributeType::Bool)])
}

/// The `ontap_svm` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvmResource;

#[async_trait]
impl Resource for SvmResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("A storage virtual machine")
            .with_attribute("uuid", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("comment", Attribute::optional_string())
            .with_attribute(
                "subtype",
                Attribute::optional_computed(AttributeType::String)
                    .with_description("default, dp_destination, sync_source or sync_destination")
                    .with_force_new(),
            )
            .with_attribute("language", Attribute::optional_computed(AttributeType::String))
            .with_attribute(
                "nfs",
                Attribute::optional_computed(AttributeType::Bool)
                    .with_description("Enable NFS on the SVM"),
            )
            .with_attribute("cifs", Attribute::optional_computed(cifs_type()))
            .with_attribute("dns", Attribute::optional_computed(dns_type()))
            .with_attribute(
                "ip_interfaces",
                Attribute::optional(ip_interfaces_type())
                    .with_description("Data interfaces created with the SVM")
                    .with_force_new(),
            )
            .with_attribute(
                "ipspace",
                Attribute::optional_computed(AttributeType::String)
                    .with_description("IPspace name")
                    .with_force_new(),
            )
            .with_attribute("routes", Attribute::optional(routes_type()).with_force_new())
            .with_attribute("state", Attribute::computed_string())
    }

    async fn create(&self, client: &OntapClient, planned: Value) -> Result<Value, ProviderError> {
        let config: SvmState = decode(planned)?;
        let created = client.create_svm(&config.to_create_model()).await?;
        encode(&self.schema(), &SvmState::from_svm(created, &config))
    }

    async fn read(&self, client: &OntapClient, current: Value) -> Result<Value, ProviderError> {
        let current: SvmState = decode(current)?;
        let uuid = required(current.uuid.clone(), "uuid")?;
        let svm = client.get_svm(&uuid).await?;
        encode(&self.schema(), &SvmState::from_svm(svm, &current))
    }

    async fn update(
        &self,
        client: &OntapClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: SvmState = decode(prior)?;
        let planned: SvmState = decode(planned)?;
        let uuid = required(prior.uuid, "uuid")?;
        let updated = client.update_svm(&planned.to_patch_model(uuid)).await?;
        encode(&self.schema(), &SvmState::from_svm(updated, &planned))
    }

    async fn delete(&self, client: &OntapClient, current: Value) -> Result<(), ProviderError> {
        let state: SvmState = decode(current)?;
        let uuid = required(state.uuid, "uuid")?;
        client.delete_svm(&uuid).await?;
        Ok(())
    }

    async fn import_state(&self, client: &OntapClient, id: &str) -> Result<Value, ProviderError> {
        if id.trim().is_empty() || id.contains('/') {
            return Err(ProviderError::Validation(format!(
                "svm import id must be an SVM UUID, got '{}'",
                id
            )));
        }
        debug!(id, "importing svm");
        let svm = client.get_svm(id).await?;
        encode(&self.schema(), &SvmState::from_svm(svm, &SvmState::default()))
    }
}

/// The `ontap_svm` data source. Looks up by `uuid` or `name` and exposes
/// the whole SVM record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvmDataSource;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SvmQuery {
    uuid: Option<String>,
    name: Option<String>,
}

#[async_trait]
impl DataSource for SvmDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let computed = Attribute::computed;
        Schema::new()
            .with_description("Look up an existing SVM")
            .with_attribute("uuid", Attribute::optional_computed(AttributeType::String))
            .with_attribute("name", Attribute::optional_computed(AttributeType::String))
            .with_attribute("aggregates", computed(AttributeType::list(AttributeType::reference())))
            .with_attribute("aggregates_delegated", Attribute::computed_bool())
            .with_attribute("certificate", computed(AttributeType::reference()))
            .with_attribute("cifs", computed(cifs_type()))
            .with_attribute("comment", Attribute::computed_string())
            .with_attribute("dns", computed(dns_type()))
            .with_attribute(
                "fc_interfaces",
                computed(AttributeType::list(AttributeType::object([
                    ("data_protocol", AttributeType::String),
                    ("name", AttributeType::String),
                    ("uuid", AttributeType::String),
                ]))),
            )
            .with_attribute("fcp", computed(enabled_type()))
            .with_attribute("ip_interfaces", computed(ip_interfaces_type()))
            .with_attribute("ipspace", computed(AttributeType::reference()))
            .with_attribute("iscsi", computed(enabled_type()))
            .with_attribute("language", Attribute::computed_string())
            .with_attribute(
                "ldap",
                computed(AttributeType::object([
                    ("ad_domain", AttributeType::String),
                    ("base_dn", AttributeType::String),
                    ("bind_dn", AttributeType::String),
                    ("enabled", AttributeType::Bool),
                    ("servers", AttributeType::string_list()),
                ])),
            )
            .with_attribute("nfs", computed(enabled_type()))
            .with_attribute(
                "nis",
                computed(AttributeType::object([
                    ("domain", AttributeType::String),
                    ("enabled", AttributeType::Bool),
                    ("servers", AttributeType::string_list()),
                ])),
            )
            .with_attribute(
                "nsswitch",
                computed(AttributeType::object([
                    ("group", AttributeType::string_list()),
                    ("hosts", AttributeType::string_list()),
                    ("namemap", AttributeType::string_list()),
                    ("netgroup", AttributeType::string_list()),
                    ("passwd", AttributeType::string_list()),
                ])),
            )
            .with_attribute("nvme", computed(enabled_type()))
            .with_attribute("routes", computed(routes_type()))
            .with_attribute(
                "s3",
                computed(AttributeType::object([
                    ("enabled", AttributeType::Bool),
                    ("name", AttributeType::String),
                ])),
            )
            .with_attribute(
                "snapmirror",
                computed(AttributeType::object([
                    ("is_protected", AttributeType::Bool),
                    ("protected_volumes_count", AttributeType::Int64),
                ])),
            )
            .with_attribute("snapshot_policy", computed(AttributeType::reference()))
            .with_attribute("state", Attribute::computed_string())
            .with_attribute("subtype", Attribute::computed_string())
    }

    async fn read(&self, client: &OntapClient, config: Value) -> Result<Value, ProviderError> {
        let query: SvmQuery = decode(config)?;
        let svm = match (query.uuid, query.name) {
            (Some(uuid), _) => client.get_svm(&uuid).await?,
            (None, Some(name)) => client.find_svm_by_name(&name).await?,
            (None, None) => {
                return Err(ProviderError::Validation(
                    "either 'uuid' or 'name' must be set".to_string(),
                ))
            },
        };
        encode(&self.schema(), &svm)
    }
}
