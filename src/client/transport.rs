//! HTTP transport seam.
//!
//! [`OntapClient`](super::OntapClient) talks to ONTAP through the
//! [`Transport`] trait so the job protocol and the entity mappers can run
//! against a scripted transport in tests. [`ReqwestTransport`] is the real
//! implementation. Its TLS settings belong to the one client that owns it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::Value;

use crate::error::ClientError;

/// HTTP Basic credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// ONTAP user name.
    pub username: String,
    /// ONTAP password.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully resolved request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Basic auth credentials.
    pub credentials: Credentials,
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Body as lossy UTF-8, for diagnostics.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a single HTTP exchange. No retries, no job handling.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return whatever ONTAP answered.
    ///
    /// Only failures that produce no HTTP response are errors here.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Settings for the reqwest transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Skip TLS certificate verification for this client only.
    pub accept_invalid_certs: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`Transport`] backed by a dedicated `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with its own connection pool and TLS settings.
    pub fn new(config: &TransportConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .basic_auth(&request.credentials.username, Some(&request.credentials.password))
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "netapp1!");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("netapp1!"));
    }

    #[test]
    fn test_reqwest_transport_builds_with_insecure_tls() {
        let config = TransportConfig {
            accept_invalid_certs: true,
            timeout: Duration::from_secs(5),
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_body_text() {
        let response = ApiResponse {
            status: 500,
            body: b"internal".to_vec(),
        };
        assert_eq!(response.body_text(), "internal");
    }
}
