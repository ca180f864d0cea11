//! Provider configuration.
//!
//! Connection settings come from the provider configuration block, with
//! `ONTAP_HOSTNAME`, `ONTAP_USERNAME` and `ONTAP_PASSWORD` filling in
//! anything left unset.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::client::ClientConfig;
use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};

/// Environment variable for the cluster host.
pub const HOSTNAME_ENV: &str = "ONTAP_HOSTNAME";
/// Environment variable for the user name.
pub const USERNAME_ENV: &str = "ONTAP_USERNAME";
/// Environment variable for the password.
pub const PASSWORD_ENV: &str = "ONTAP_PASSWORD";

/// The provider configuration block.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Cluster management address.
    pub hostname: Option<String>,
    /// ONTAP user.
    pub username: Option<String>,
    /// ONTAP password.
    pub password: Option<String>,
    /// Skip TLS verification.
    pub ignore_ssl_errors: Option<bool>,
    /// Per-request timeout in seconds.
    pub request_timeout_seconds: Option<i64>,
    /// Delay between job polls in seconds.
    pub poll_interval_seconds: Option<i64>,
    /// Ceiling on job polling in seconds.
    pub job_timeout_seconds: Option<i64>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ignore_ssl_errors", &self.ignore_ssl_errors)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("poll_interval_seconds", &self.poll_interval_seconds)
            .field("job_timeout_seconds", &self.job_timeout_seconds)
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the configuration block.
    ///
    /// Connection attributes are optional here because they may come from
    /// the environment; [`ProviderConfig::resolve`] enforces them.
    pub fn schema() -> Schema {
        Schema::new()
            .with_description("ONTAP cluster connection")
            .with_attribute(
                "hostname",
                Attribute::optional_string()
                    .with_description("Cluster management address. Defaults to $ONTAP_HOSTNAME"),
            )
            .with_attribute(
                "username",
                Attribute::optional_string()
                    .with_description("Defaults to $ONTAP_USERNAME")
                    .sensitive(),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .with_description("Defaults to $ONTAP_PASSWORD")
                    .sensitive(),
            )
            .with_attribute(
                "ignore_ssl_errors",
                Attribute::optional_bool().with_description("Skip TLS certificate verification"),
            )
            .with_attribute("request_timeout_seconds", Attribute::optional(AttributeType::Int64))
            .with_attribute("poll_interval_seconds", Attribute::optional(AttributeType::Int64))
            .with_attribute("job_timeout_seconds", Attribute::optional(AttributeType::Int64))
    }

    /// Fill unset connection values through `lookup` (normally the process
    /// environment) and build a [`ClientConfig`].
    pub fn resolve<F>(self, lookup: F) -> Result<ClientConfig, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diagnostics = Vec::new();
        let mut setting = |value: Option<String>, attribute: &str, env: &str| {
            let value = value.or_else(|| lookup(env)).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                diagnostics.push(
                    Diagnostic::error(format!("Missing {}", attribute))
                        .with_detail(format!(
                            "Set '{}' in the provider block or {}",
                            attribute, env
                        ))
                        .with_attribute(attribute),
                );
            }
            value.unwrap_or_default()
        };
        let hostname = setting(self.hostname, "hostname", HOSTNAME_ENV);
        let username = setting(self.username, "username", USERNAME_ENV);
        let password = setting(self.password, "password", PASSWORD_ENV);

        let mut config = ClientConfig::new(hostname, username, password)
            .with_ignore_ssl_errors(self.ignore_ssl_errors.unwrap_or(false));

        let durations = [
            ("request_timeout_seconds", self.request_timeout_seconds),
            ("poll_interval_seconds", self.poll_interval_seconds),
            ("job_timeout_seconds", self.job_timeout_seconds),
        ];
        for (attribute, seconds) in durations {
            let Some(seconds) = seconds else { continue };
            if seconds <= 0 {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid {}", attribute))
                        .with_detail(format!(
                            "Expected a positive number of seconds, got {}",
                            seconds
                        ))
                        .with_attribute(attribute),
                );
                continue;
            }
            let duration = Duration::from_secs(seconds as u64);
            config = match attribute {
                "request_timeout_seconds" => config.with_request_timeout(duration),
                "poll_interval_seconds" => config.with_poll_interval(duration),
                _ => config.with_job_timeout(duration),
            };
        }

        if diagnostics.is_empty() {
            Ok(config)
        } else {
            Err(diagnostics)
        }
    }
}

/// Look a variable up in the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_from_block() {
        let config: ProviderConfig = serde_json::from_value(json!({
            "hostname": "cluster1",
            "username": "admin",
            "password": "pw",
            "ignore_ssl_errors": true,
            "job_timeout_seconds": 30
        }))
        .unwrap();

        let client = config.resolve(no_env).unwrap();
        assert_eq!(client.base_url(), "https://cluster1");
        assert!(client.ignore_ssl_errors);
        assert_eq!(client.job_timeout, Duration::from_secs(30));
        assert_eq!(client.poll_interval, crate::client::DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_resolve_falls_back_to_env() {
        let env = |name: &str| match name {
            HOSTNAME_ENV => Some("cluster2".to_string()),
            USERNAME_ENV => Some("ops".to_string()),
            PASSWORD_ENV => Some("secret".to_string()),
            _ => None,
        };
        let config = ProviderConfig {
            username: Some("admin".into()),
            ..ProviderConfig::default()
        };

        let client = config.resolve(env).unwrap();
        assert_eq!(client.hostname, "cluster2");
        assert_eq!(client.credentials.username, "admin");
        assert_eq!(client.credentials.password, "secret");
    }

    #[test]
    fn test_resolve_reports_every_problem() {
        let config = ProviderConfig {
            hostname: Some("cluster1".into()),
            poll_interval_seconds: Some(0),
            ..ProviderConfig::default()
        };

        let diagnostics = config.resolve(no_env).unwrap_err();
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, vec!["username", "password", "poll_interval_seconds"]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ProviderConfig {
            password: Some("hunter2".into()),
            ..ProviderConfig::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_schema_accepts_full_block() {
        let diags = validate(
            &ProviderConfig::schema(),
            &json!({
                "hostname": "cluster1",
                "username": "admin",
                "password": "pw",
                "ignore_ssl_errors": false,
                "request_timeout_seconds": 10,
                "poll_interval_seconds": 1,
                "job_timeout_seconds": 600
            }),
        );
        assert!(diags.is_empty());
    }
}
