//! Asynchronous job tracking.
//!
//! ONTAP answers long-running writes with `202 Accepted` and a job link.
//! The job is polled until it reaches a terminal state:
//!
//! | state     | outcome                          |
//! |-----------|----------------------------------|
//! | `success` | the final job body is returned   |
//! | `failure` | [`ClientError::JobFailed`]       |
//! | `error`   | [`ClientError::JobErrored`]      |
//! | other     | poll again after `poll_interval` |
//!
//! Polling stops with [`ClientError::JobTimeout`] once `job_timeout` has
//! elapsed, or with [`ClientError::Cancelled`] when the client's token fires.

use reqwest::Method;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::{code_string, OntapClient};
use crate::error::ClientError;

/// Body of a `202 Accepted` response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobAccepted {
    /// The job started by the request.
    pub job: JobHandle,
}

/// Reference to a running job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobHandle {
    /// Job UUID, when reported.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Job links.
    #[serde(rename = "_links")]
    pub links: Links,
}

/// HAL links block.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Link to the job itself.
    #[serde(rename = "self")]
    pub self_link: Link,
}

/// A single HAL link.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Path relative to the cluster root, e.g. `/api/cluster/jobs/<uuid>`.
    pub href: String,
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Accepted, not started.
    Queued,
    /// In progress.
    Running,
    /// Suspended by an administrator.
    Paused,
    /// Finished; the change is applied.
    Success,
    /// Finished without applying the change.
    Failure,
    /// ONTAP could not run the job.
    Error,
    /// A state this client does not know; polled like `running`.
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Whether polling should stop.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Error)
    }
}

/// Job status as returned by `GET /api/cluster/jobs/<uuid>`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    /// Current state.
    pub state: JobState,
    /// Progress or failure text.
    #[serde(default)]
    pub message: Option<String>,
    /// ONTAP error code, sent as a number or a string.
    #[serde(default, deserialize_with = "code_string")]
    pub code: Option<String>,
    /// Job UUID.
    #[serde(default)]
    pub uuid: Option<String>,
    /// What the job does, e.g. `POST /api/storage/qtrees`.
    #[serde(default)]
    pub description: Option<String>,
    /// ISO 8601 timestamp.
    #[serde(default)]
    pub start_time: Option<String>,
    /// ISO 8601 timestamp, set once terminal.
    #[serde(default)]
    pub end_time: Option<String>,
}

impl OntapClient {
    /// Poll the job at `href` until it is terminal.
    ///
    /// Returns the body of the final `success` poll.
    #[instrument(skip(self), fields(job = %href))]
    pub async fn wait_for_job(&self, href: &str) -> Result<Vec<u8>, ClientError> {
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let response = self.send(Method::GET, href, None).await?;
            polls += 1;
            if !(200..=299).contains(&response.status) {
                return Err(super::status_error(&response));
            }

            let status: JobStatus = serde_json::from_slice(&response.body)?;
            debug!(state = ?status.state, polls, "job polled");

            match status.state {
                JobState::Success => {
                    info!(polls, elapsed = ?started.elapsed(), "job completed");
                    return Ok(response.body);
                },
                JobState::Failure => {
                    let message = status.message.unwrap_or_default();
                    warn!(%message, "job failed");
                    return Err(ClientError::JobFailed {
                        message,
                        code: status.code,
                    });
                },
                JobState::Error => {
                    let message = status.message.unwrap_or_default();
                    warn!(%message, "job ended in error state");
                    return Err(ClientError::JobErrored {
                        message,
                        code: status.code,
                    });
                },
                _ => {},
            }

            let remaining = self.job_timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                warn!(polls, "job did not complete before the timeout");
                return Err(ClientError::JobTimeout {
                    job: href.to_string(),
                    timeout: self.job_timeout,
                });
            }

            // The last wait is cut short so the final poll lands on the deadline.
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval.min(remaining)) => {},
            }
        }
    }
}
