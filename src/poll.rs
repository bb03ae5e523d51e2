//! Bounded polling for asynchronous queries.
//!
//! CloudWatch Logs Insights runs a query in the background and hands back a
//! query id. [`AsyncQueryPoller`] asks the provider for the query's status
//! until it reaches a terminal state, sleeping with capped exponential
//! backoff between attempts.
//!
//! Each call to [`AsyncQueryPoller::poll_until_complete`] owns its own
//! [`Backoff`] and attempt counter, so any number of polls can run
//! concurrently against a shared provider.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ApiError;

/// Opaque identifier of a submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryHandle(String);

impl QueryHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the provider for a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Scheduled,
    Running,
    Complete,
    Failed,
    Cancelled,
    /// Any value the provider reports that we do not recognise.
    /// Treated as still pending.
    Other(String),
}

impl PollStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Scheduled" => Self::Scheduled,
            "Running" => Self::Running,
            "Complete" => Self::Complete,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => f.write_str("Scheduled"),
            Self::Running => f.write_str("Running"),
            Self::Complete => f.write_str("Complete"),
            Self::Failed => f.write_str("Failed"),
            Self::Cancelled => f.write_str("Cancelled"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// One answer from the status provider.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport<P> {
    pub status: PollStatus,
    pub payload: P,
}

/// Something that can report the status of a submitted query.
///
/// Must be safe to call repeatedly for the same handle.
#[async_trait]
pub trait QueryStatusProvider: Send + Sync {
    type Payload: Send;

    async fn query_status(
        &self,
        handle: &QueryHandle,
    ) -> Result<StatusReport<Self::Payload>, ApiError>;
}

/// Tuning for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSettings {
    /// Upper bound on status calls before giving up
    pub max_attempts: u32,
    /// Wait after the first pending status
    pub initial_delay: Duration,
    /// No single wait exceeds this
    pub max_delay: Duration,
    /// Growth factor applied to the wait after every attempt
    pub multiplier: f64,
}

impl PollSettings {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
    pub const DEFAULT_MULTIPLIER: f64 = 1.5;

    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Self::default()
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_delay, self.max_delay, self.multiplier)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }
}

/// Capped exponential backoff.
///
/// Yields `min(initial, cap)`, then grows by `multiplier` per step, never
/// exceeding `cap`. The sequence is non-decreasing.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    cap: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(initial: Duration, cap: Duration, multiplier: f64) -> Self {
        Self {
            current: initial.min(cap),
            cap,
            multiplier,
        }
    }

    /// The wait for the current attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let wait = self.current.min(self.cap);
        self.current = self.current.mul_f64(self.multiplier).min(self.cap);
        wait
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("CloudWatch Logs query failed for {subject} (query_id: {handle})")]
    QueryFailed { handle: QueryHandle, subject: String },

    #[error("CloudWatch Logs query was cancelled for {subject} (query_id: {handle})")]
    QueryCancelled { handle: QueryHandle, subject: String },

    #[error(
        "CloudWatch Logs query timed out after {max_attempts} attempts for {subject} (query_id: {handle})"
    )]
    QueryTimeout {
        handle: QueryHandle,
        max_attempts: u32,
        subject: String,
    },

    #[error(transparent)]
    Provider(#[from] ApiError),
}

/// Waits for an asynchronous query to finish.
#[derive(Debug, Clone, Default)]
pub struct AsyncQueryPoller {
    settings: PollSettings,
}

impl AsyncQueryPoller {
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    /// Poll `provider` until the query behind `handle` completes.
    ///
    /// `subject` names what the query is about (e.g. `pod web-1`) and only
    /// appears in logs and error messages.
    ///
    /// Provider errors are returned immediately; only pending statuses are
    /// retried. The wait between attempts is a tokio sleep, so other tasks
    /// keep running while a query is in flight.
    pub async fn poll_until_complete<P>(
        &self,
        provider: &P,
        handle: &QueryHandle,
        subject: &str,
    ) -> Result<P::Payload, PollError>
    where
        P: QueryStatusProvider + ?Sized,
    {
        let max_attempts = self.settings.max_attempts;
        let mut backoff = self.settings.backoff();
        let mut attempts: u32 = 0;

        log::info!("Polling for CloudWatch Logs query results (query_id: {handle})");

        while attempts < max_attempts {
            let report = provider.query_status(handle).await?;

            match report.status {
                PollStatus::Complete => {
                    log::info!(
                        "CloudWatch Logs query completed successfully after {} attempts",
                        attempts + 1
                    );
                    return Ok(report.payload);
                }
                PollStatus::Failed => {
                    let err = PollError::QueryFailed {
                        handle: handle.clone(),
                        subject: subject.to_string(),
                    };
                    log::error!("{err}");
                    return Err(err);
                }
                PollStatus::Cancelled => {
                    let err = PollError::QueryCancelled {
                        handle: handle.clone(),
                        subject: subject.to_string(),
                    };
                    log::error!("{err}");
                    return Err(err);
                }
                PollStatus::Other(ref raw) => {
                    log::warn!(
                        "Unrecognised status '{raw}' for query {handle}, treating it as pending"
                    );
                }
                PollStatus::Scheduled | PollStatus::Running => {}
            }

            if attempts % 5 == 0 {
                log::info!(
                    "Waiting for CloudWatch Logs query to complete (attempt {}/{max_attempts})",
                    attempts + 1
                );
            }

            tokio::time::sleep(backoff.next_delay()).await;
            attempts += 1;
        }

        let err = PollError::QueryTimeout {
            handle: handle.clone(),
            max_attempts,
            subject: subject.to_string(),
        };
        log::error!("{err}");
        Err(err)
    }
}
