//! Error types for the ONTAP provider.
//!
//! Two layers of errors exist:
//!
//! - [`ClientError`] is produced by the REST client and keeps the raw detail
//!   ONTAP returned (status codes, structured error bodies, job messages).
//! - [`ProviderError`] is what resource and data source operations surface to
//!   the host. Client errors are folded into it so that "resource is gone",
//!   "took too long" and "was cancelled" stay distinguishable.

use std::time::Duration;

use thiserror::Error;

use crate::schema::Diagnostic;

/// Boxed error used for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`OntapClient`](crate::client::OntapClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (connection, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// ONTAP answered 404 with a structured error body.
    #[error("{code}: {message}")]
    NotFound {
        /// ONTAP error code.
        code: String,
        /// ONTAP error message.
        message: String,
    },

    /// ONTAP answered with a status outside the success range.
    #[error("status: {status}, body: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// An asynchronous job reached the `failure` state.
    #[error("Job failed: {message}")]
    JobFailed {
        /// Message reported by the job.
        message: String,
        /// Error code reported by the job, when present.
        code: Option<String>,
    },

    /// An asynchronous job reached the `error` state.
    #[error("Job ended in error state: {message}")]
    JobErrored {
        /// Message reported by the job.
        message: String,
        /// Error code reported by the job, when present.
        code: Option<String>,
    },

    /// Job polling exceeded the configured ceiling.
    #[error("Job {job} did not complete within {timeout:?}")]
    JobTimeout {
        /// Link of the job being polled.
        job: String,
        /// The ceiling that was exceeded.
        timeout: Duration,
    },

    /// The client's cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,

    /// A lookup query returned no records.
    #[error("No {kind} found matching {query}")]
    LookupNotFound {
        /// Entity kind being looked up.
        kind: &'static str,
        /// Human readable query description.
        query: String,
    },

    /// A lookup query returned more than one record.
    #[error("{count} {kind} records match {query}, expected exactly one")]
    AmbiguousLookup {
        /// Entity kind being looked up.
        kind: &'static str,
        /// Human readable query description.
        query: String,
        /// Number of records returned.
        count: usize,
    },

    /// A field the request needs was not supplied by the caller.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A request or response body could not be (de)serialized.
    #[error("Invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether this error means the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::LookupNotFound { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Errors surfaced by resource and data source operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Input did not satisfy the declared schema.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is missing or has invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// State could not be converted to or from its typed model.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The ONTAP API rejected or failed the operation.
    #[error("ONTAP API error: {0}")]
    Api(#[source] ClientError),

    /// An asynchronous job did not finish in time.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The operation was cancelled by a provider stop.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Operation not supported for this type.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Get the error message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::DeadlineExceeded(msg)
            | Self::Cancelled(msg)
            | Self::Unimplemented(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Api(err) => err.to_string(),
        }
    }

    /// Render this error as an error diagnostic for the host.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let summary = match self {
            Self::NotFound(_) => "Resource not found",
            Self::Validation(_) => "Invalid configuration",
            Self::Configuration(_) => "Provider configuration error",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Serialization(_) => "State serialization error",
            Self::Api(_) => "Client Error",
            Self::DeadlineExceeded(_) => "Job timed out",
            Self::Cancelled(_) => "Operation cancelled",
            Self::Unimplemented(_) => "Unsupported operation",
        };
        Diagnostic::error(summary).with_detail(self.message())
    }
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { .. } | ClientError::LookupNotFound { .. } => {
                Self::NotFound(err.to_string())
            },
            ClientError::JobTimeout { .. } => Self::DeadlineExceeded(err.to_string()),
            ClientError::Cancelled => Self::Cancelled(err.to_string()),
            ClientError::Configuration(msg) => Self::Configuration(msg),
            ClientError::MissingField(field) => {
                Self::Validation(format!("missing required attribute '{}'", field))
            },
            other => Self::Api(other),
        }
    }
}
