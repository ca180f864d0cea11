//! ONTAP REST client.
//!
//! [`OntapClient::execute`] is the single entry point for every exchange:
//!
//! - 2xx (other than 202): the body is returned as-is
//! - 202: the body carries a job link which is polled until the job is
//!   terminal (see [`job`]); the final job-status body is returned
//! - 404: the structured ONTAP error body becomes [`ClientError::NotFound`]
//! - anything else: [`ClientError::Api`] with the raw status and body
//!
//! Because a 202 returns the job body rather than the entity, every write
//! helper in [`qtree`] and [`svm`] re-reads the entity afterwards.

pub mod job;
pub mod qtree;
pub mod svm;
pub mod transport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ClientError;
pub use transport::{
    ApiRequest, ApiResponse, Credentials, ReqwestTransport, Transport, TransportConfig,
};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between two job polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default ceiling on the total time spent polling one job.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);

/// Settings used to build an [`OntapClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Cluster management host, optionally with an `http://`/`https://` scheme.
    pub hostname: String,
    /// Credentials sent with every request.
    pub credentials: Credentials,
    /// Skip TLS verification for this client.
    pub ignore_ssl_errors: bool,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between job polls.
    pub poll_interval: Duration,
    /// Ceiling on total job polling time.
    pub job_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts.
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            credentials: Credentials::new(username, password),
            ignore_ssl_errors: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    /// Skip TLS certificate verification.
    pub fn with_ignore_ssl_errors(mut self, ignore: bool) -> Self {
        self.ignore_ssl_errors = ignore;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the delay between job polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the ceiling on job polling time.
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("credentials", &self.credentials)
            .field("ignore_ssl_errors", &self.ignore_ssl_errors)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("job_timeout", &self.job_timeout)
            .finish()
    }
}

/// Client for the ONTAP REST API.
///
/// Cloning is cheap; clones share the transport and cancellation token.
#[derive(Clone)]
pub struct OntapClient {
    base_url: String,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
    job_timeout: Duration,
    cancel: CancellationToken,
}

impl OntapClient {
    /// Build a client with a dedicated reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.hostname.trim().is_empty() {
            return Err(ClientError::Configuration("hostname must not be empty".into()));
        }
        let transport = ReqwestTransport::new(&TransportConfig {
            accept_invalid_certs: config.ignore_ssl_errors,
            timeout: config.request_timeout,
        })?;
        if config.ignore_ssl_errors {
            warn!(host = %config.hostname, "TLS certificate verification disabled for this client");
        }
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client on top of an existing transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url(),
            credentials: config.credentials,
            transport,
            poll_interval: config.poll_interval,
            job_timeout: config.job_timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token observed by requests and job polling.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The token that aborts in-flight requests and job polling.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Base URL of the cluster.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and resolve any asynchronous job it starts.
    ///
    /// `path` is relative to the cluster root and may carry a query string.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Vec<u8>, ClientError> {
        let response = self.send(method, path, body).await?;
        match response.status {
            202 => {
                let accepted: job::JobAccepted = serde_json::from_slice(&response.body)?;
                self.wait_for_job(&accepted.job.links.self_link.href).await
            },
            200..=299 => Ok(response.body),
            _ => Err(status_error(&response)),
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.execute(Method::GET, path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// One HTTP exchange with credentials attached, abandoned on cancellation.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method: method.clone(),
            url: format!("{}{}", self.base_url, path),
            body,
            credentials: self.credentials.clone(),
        };

        debug!(%method, path, "sending ONTAP request");
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
            result = self.transport.send(request) => result?,
        };
        debug!(%method, path, status = response.status, "ONTAP response received");

        Ok(response)
    }
}

impl fmt::Debug for OntapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OntapClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("poll_interval", &self.poll_interval)
            .field("job_timeout", &self.job_timeout)
            .finish()
    }
}

/// Envelope of an ONTAP collection response.
#[derive(Debug, Deserialize)]
pub struct Records<T> {
    /// Returned records.
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    /// Record count as reported by ONTAP.
    #[serde(default)]
    pub num_records: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default, deserialize_with = "code_string")]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

fn status_error(response: &ApiResponse) -> ClientError {
    if response.status == 404 {
        return match serde_json::from_slice::<ErrorBody>(&response.body) {
            Ok(parsed) => ClientError::NotFound {
                code: parsed.error.code.unwrap_or_default(),
                message: parsed.error.message,
            },
            Err(_) => ClientError::NotFound {
                code: String::new(),
                message: response.body_text(),
            },
        };
    }
    ClientError::Api {
        status: response.status,
        body: response.body_text(),
    }
}

/// Take the only record of a lookup, or explain why there isn't exactly one.
pub(crate) fn single<T>(
    records: Vec<T>,
    kind: &'static str,
    query: String,
) -> Result<T, ClientError> {
    let count = records.len();
    let mut records = records.into_iter();
    match (records.next(), count) {
        (Some(record), 1) => Ok(record),
        (None, _) => Err(ClientError::LookupNotFound { kind, query }),
        (Some(_), count) => Err(ClientError::AmbiguousLookup { kind, query, count }),
    }
}

/// ONTAP reports codes as strings in error bodies and as numbers in jobs.
pub(crate) fn code_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
