//! ONTAP provider
//!
//! Manages NetApp ONTAP qtrees and storage virtual machines (SVMs) through
//! the ONTAP REST API.
//!
//! # Overview
//!
//! - **Client** ([`client`]): authenticated REST calls. Writes that ONTAP
//!   runs asynchronously answer `202 Accepted` with a job link; the client
//!   polls the job until it succeeds, fails, times out or is cancelled.
//! - **Models** ([`models`]): wire structs. Unset fields are omitted from
//!   request bodies.
//! - **Resources** ([`resources`]): `ontap_qtree` and `ontap_svm`, each as a
//!   resource and a data source.
//! - **Provider** ([`OntapProvider`]): implements [`ProviderService`],
//!   which a host uses to configure, validate, plan and apply.
//!
//! # Quick Start
//!
//! ```no_run
//! use ontap_provider::{init_logging, OntapProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = OntapProvider::new();
//!     provider
//!         .configure(json!({
//!             "hostname": "cluster1.example.com",
//!             "username": "admin",
//!             "password": "secret",
//!         }))
//!         .await?;
//!
//!     let qtree = provider
//!         .create(
//!             "ontap_qtree",
//!             json!({"name": "q1", "svm_uuid": "S1", "volume_uuid": "V1"}),
//!         )
//!         .await?;
//!     tracing::info!(uuid = %qtree["uuid"], "qtree ready");
//!     Ok(())
//! }
//! ```
//!
//! # Identity
//!
//! SVMs are identified by their UUID. Qtrees are identified by
//! `<volume uuid>/<qtree id>`, which is also the import id.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{ClientConfig, OntapClient};
pub use error::{ClientError, ProviderError};
pub use logging::{init_logging, init_logging_with, try_init_logging, LogFormat};
pub use provider::OntapProvider;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;
pub use serde_json;
pub use tracing;
