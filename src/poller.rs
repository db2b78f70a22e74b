//! Polling of the asynchronous import jobs
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::sleep;

use crate::tracker::DestinationTracker;

/// How often and how long an import job is polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of status requests before giving up
    pub max_attempts: u32,

    /// Delay, in units, before the first request
    pub first_delay: u32,

    /// Delay unit
    pub unit: Duration,
}

impl Default for PollPolicy {
    /// 31 requests waiting 5s, 6s, ... 35s
    fn default() -> Self {
        Self {
            max_attempts: 31,
            first_delay: 5,
            unit: Duration::from_secs(1),
        }
    }
}

impl PollPolicy {
    /// Delay before the request number `attempt` (starting at 0)
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.unit * self.first_delay.saturating_add(attempt)
    }
}

/// Terminal state of an import job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job created an issue, at this api url
    Resolved(String),

    /// No issue url after every attempt
    Exhausted {
        /// Last error seen while polling
        last_error: Option<String>,
    },
}

/// Poll `status_url` until it yields an issue url or the attempts run out.
///
/// Errors do not stop the polling: a missing admin permission shows up as
/// `Not Found` here and ends as [`PollOutcome::Exhausted`].
pub async fn poll_import(
    destination: &dyn DestinationTracker,
    status_url: &str,
    policy: &PollPolicy,
) -> PollOutcome {
    let mut last_error = None;
    for attempt in 0..policy.max_attempts {
        sleep(policy.delay_before(attempt)).await;
        debug!("Sending {status_url}");
        match destination.import_status(status_url.to_string()).await {
            Ok(status) => {
                if let Some(url) = status.resolved_url() {
                    return PollOutcome::Resolved(url.to_string());
                }
                if let Some(detail) = status.error_detail() {
                    warn!("Import {status_url} reported: {detail}");
                    last_error = Some(detail);
                }
                info!(
                    "No issue url for {status_url} after {} requests ({})",
                    attempt + 1,
                    status.status.as_deref().unwrap_or("unknown")
                );
            }
            Err(e) => {
                warn!("Polling {status_url} failed: {e}");
                last_error = Some(e.to_string());
            }
        }
    }
    PollOutcome::Exhausted { last_error }
}
