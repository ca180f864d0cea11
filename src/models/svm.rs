//! SVM wire model for `/api/svm/svms`.

use serde::{Deserialize, Serialize};

use super::ObjectRef;
use crate::error::ClientError;

/// A storage virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Svm {
    /// Assigned by ONTAP on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// SVM name, unique in the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Aggregates volumes may be created on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<Vec<ObjectRef>>,
    /// Whether volume creation is delegated to the SVM administrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates_delegated: Option<bool>,
    /// Server certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ObjectRef>,
    /// CIFS server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cifs: Option<Cifs>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// DNS configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<Dns>,
    /// FC logical interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fc_interfaces: Option<Vec<FcInterface>>,
    /// FC protocol toggle. Read-only on modify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp: Option<Protocol>,
    /// IP logical interfaces. Create-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_interfaces: Option<Vec<IpInterface>>,
    /// IPspace, referenced by name on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipspace: Option<ObjectRef>,
    /// iSCSI protocol toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscsi: Option<Protocol>,
    /// Default volume language, e.g. `c.utf_8`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// LDAP client configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldap: Option<Ldap>,
    /// NFS protocol toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs: Option<Protocol>,
    /// NIS configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nis: Option<Nis>,
    /// Name service switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsswitch: Option<NsSwitch>,
    /// NVMe protocol toggle. Read-only on modify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvme: Option<Protocol>,
    /// Static routes. Create-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
    /// S3 server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3>,
    /// SnapMirror protection. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapmirror: Option<Snapmirror>,
    /// Default snapshot policy for new volumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_policy: Option<ObjectRef>,
    /// `running`, `stopped`, `starting`, ... Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `default`, `dp_destination`, `sync_source`, `sync_destination`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl Svm {
    /// PATCH body: the identity and fields ONTAP rejects on modify are dropped.
    pub fn for_patch(&self) -> Self {
        Self {
            uuid: None,
            fcp: None,
            nvme: None,
            snapmirror: None,
            state: None,
            ..self.clone()
        }
    }

    /// The identity, or [`ClientError::MissingField`] if the SVM was never read.
    pub fn require_uuid(&self) -> Result<&str, ClientError> {
        self.uuid
            .as_deref()
            .filter(|uuid| !uuid.is_empty())
            .ok_or(ClientError::MissingField("uuid"))
    }
}

/// A protocol enable toggle, e.g. `"nfs": {"enabled": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    /// Whether the service is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Protocol {
    /// `{"enabled": <enabled>}`.
    pub fn enabled(enabled: bool) -> Self {
        Self { enabled: Some(enabled) }
    }
}

/// CIFS server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cifs {
    /// Active Directory domain to join.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_domain: Option<AdDomain>,
    /// Whether the service is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// CIFS server NetBIOS name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Active Directory domain membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdDomain {
    /// Fully qualified domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// OU the machine account is created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,
}

/// DNS client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dns {
    /// Search domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    /// Name server addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

/// An FC logical interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcInterface {
    /// `fcp` or `fc_nvme`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_protocol: Option<String>,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// An IP logical interface created with the SVM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInterface {
    /// Address and netmask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddress>,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// e.g. `default-data-files`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_policy: Option<String>,
    /// e.g. `data_nfs`, `data_cifs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    /// UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// Interface address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    /// IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Netmask or prefix length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
}

/// LDAP client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ldap {
    /// Active Directory domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_domain: Option<String>,
    /// Search base DN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,
    /// Bind DN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,
    /// Whether the service is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// LDAP server addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

/// NIS client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nis {
    /// NIS domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Whether the service is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// NIS server addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

/// Name service source order per database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsSwitch {
    /// Sources for group lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<String>>,
    /// Sources for host lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    /// Sources for name mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namemap: Option<Vec<String>>,
    /// Sources for netgroup lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netgroup: Option<Vec<String>>,
    /// Sources for user lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passwd: Option<Vec<String>>,
}

/// A static route created with the SVM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<RouteDestination>,
    /// Next-hop address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Route destination network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDestination {
    /// IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// `ipv4` or `ipv6`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Netmask or prefix length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
}

/// S3 server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3 {
    /// Whether the service is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// S3 server name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// SnapMirror protection summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapmirror {
    /// Whether the SVM is a SnapMirror source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_protected: Option<bool>,
    /// Volumes protected by SnapMirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_volumes_count: Option<i64>,
}
