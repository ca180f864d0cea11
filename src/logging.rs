//! Logging setup.
//!
//! All output goes to **stderr**; stdout belongs to the host. Filtering
//! follows `RUST_LOG`, e.g.:
//!
//! ```bash
//! # request/poll tracing from the client
//! RUST_LOG=ontap_provider::client=debug ./provider
//!
//! # machine readable
//! ONTAP_LOG_FORMAT=json ./provider
//! ```

use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn,ontap_provider=info";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "ONTAP_LOG_FORMAT";

/// Output format of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line events.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" | "" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl LogFormat {
    /// Read the format from [`LOG_FORMAT_ENV`], falling back to compact.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// Initialize logging with the format from the environment.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with(LogFormat::from_env(), DEFAULT_FILTER);
}

/// Initialize logging with an explicit format and default filter.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with(format: LogFormat, default_filter: &str) {
    if !try_init_logging_with(format, default_filter) {
        panic!("a global tracing subscriber is already set");
    }
}

/// Like [`init_logging`], but returns `false` instead of panicking when a
/// subscriber is already installed. Handy in tests.
pub fn try_init_logging() -> bool {
    try_init_logging_with(LogFormat::from_env(), DEFAULT_FILTER)
}

fn try_init_logging_with(format: LogFormat, default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init()
            .is_ok(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new("ontap_provider::client=debug").is_ok());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
