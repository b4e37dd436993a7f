//! Print job submission with bounded retry
//!
//! A job moves `Pending → Submitting → Submitted | Failed`. Transient
//! failures go back to `Submitting` after an exponential backoff while the
//! retry budget lasts; permanent failures end the job at once. Every outcome
//! is returned as a [`JobResult`], never as an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SubmissionError;
use crate::printer::{JobOutcome, PrintService, PrinterInfo};

/// Retry configuration for [`JobSubmitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each following retry
    pub retry_backoff: Duration,
    /// Upper bound for a single backoff delay
    pub max_backoff: Duration,
    /// Ceiling on total wall-clock time across all attempts
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            deadline: Some(Duration::from_secs(60)),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_backoff)
    }
}

/// Terminal status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Failed,
    RetriedThenFailed,
}

/// Caller-owned record of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub status: JobStatus,
    /// Attempts made, at least 1 (printer resolution counts as the first)
    pub attempts: u32,
    /// Service id the job was routed to, once resolved
    pub printer_id: Option<String>,
    pub error: Option<SubmissionError>,
    pub elapsed: Duration,
}

impl JobResult {
    pub fn is_submitted(&self) -> bool {
        self.status == JobStatus::Submitted
    }

    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Hands encoded jobs to a [`PrintService`]
///
/// Holds no lock: one `submit` call is one job, and serializing jobs per
/// device is the print service's contract.
#[derive(Debug, Clone, Default)]
pub struct JobSubmitter {
    policy: RetryPolicy,
}

impl JobSubmitter {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit `data` to `printer_id` and wait for the terminal outcome
    ///
    /// `cancel` is checked at the backoff boundary and before each retry,
    /// never while bytes are in flight.
    #[instrument(skip(self, data, service, cancel), fields(data_len = data.len()))]
    pub async fn submit<S: PrintService>(
        &self,
        data: &[u8],
        printer_id: &str,
        service: &S,
        cancel: &CancellationToken,
    ) -> JobResult {
        let started = Instant::now();
        // A deadline too far out to represent is no deadline
        let deadline = self.policy.deadline.and_then(|d| started.checked_add(d));
        let finish = |attempts: u32, resolved: Option<String>, error: Option<SubmissionError>| {
            let status = match &error {
                None => JobStatus::Submitted,
                Some(SubmissionError::DeadlineExceeded) => JobStatus::Failed,
                Some(_) if attempts > 1 => JobStatus::RetriedThenFailed,
                Some(_) => JobStatus::Failed,
            };
            let result = JobResult {
                status,
                attempts,
                printer_id: resolved,
                error,
                elapsed: started.elapsed(),
            };
            match &result.error {
                None => info!(attempts, "Print job submitted"),
                Some(e) => warn!(attempts, error = %e, "Print job failed"),
            }
            result
        };

        // Pending: resolve the printer among the enumerated services
        let printers = match with_deadline(deadline, service.list_printers()).await {
            Some(printers) => printers,
            None => return finish(1, None, Some(SubmissionError::DeadlineExceeded)),
        };
        let Some(resolved) = resolve_printer(&printers, printer_id) else {
            return finish(
                1,
                None,
                Some(SubmissionError::PrinterNotFound(printer_id.to_string())),
            );
        };
        debug!(resolved = %resolved, "Printer resolved");

        let mut attempts = 0;
        loop {
            // Submitting
            attempts += 1;
            debug!(attempt = attempts, "Submitting print job");
            let outcome =
                match with_deadline(deadline, service.submit_raw_job(&resolved, data)).await {
                    Some(outcome) => outcome,
                    None => {
                        return finish(
                            attempts,
                            Some(resolved),
                            Some(SubmissionError::DeadlineExceeded),
                        );
                    }
                };

            let error = match outcome {
                JobOutcome::Success => return finish(attempts, Some(resolved), None),
                JobOutcome::TransientFailure(reason) => SubmissionError::DeviceBusy(reason),
                JobOutcome::PermanentFailure(reason) => SubmissionError::Rejected(reason),
            };

            let retry = attempts - 1;
            if !error.is_transient() || retry >= self.policy.max_retries {
                return finish(attempts, Some(resolved), Some(error));
            }

            // Backoff boundary
            let delay = self.policy.backoff(retry);
            let wake = Instant::now().checked_add(delay);
            if deadline.is_some_and(|at| wake.is_none_or(|wake| wake >= at)) {
                return finish(
                    attempts,
                    Some(resolved),
                    Some(SubmissionError::DeadlineExceeded),
                );
            }
            warn!(
                attempt = attempts,
                max_retries = self.policy.max_retries,
                delay_ms = millis(delay),
                error = %error,
                "Print attempt failed, retrying"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return finish(attempts, Some(resolved), Some(SubmissionError::Cancelled));
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if cancel.is_cancelled() {
                return finish(attempts, Some(resolved), Some(SubmissionError::Cancelled));
            }
        }
    }
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Await `fut`, or `None` once the deadline passes
async fn with_deadline<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Find the service id for `wanted`
///
/// Exact id first, then a case-insensitive match on id or display name.
fn resolve_printer(printers: &[PrinterInfo], wanted: &str) -> Option<String> {
    if let Some(p) = printers.iter().find(|p| p.id == wanted) {
        return Some(p.id.clone());
    }
    let wanted = wanted.trim().to_lowercase();
    printers
        .iter()
        .find(|p| p.id.to_lowercase() == wanted || p.display_name.to_lowercase() == wanted)
        .map(|p| p.id.clone())
}
