//! Job polling for asynchronous operations
//!
//! Mutating actions (create, delete, resize ...) answer with a `job_id` and
//! finish in the background. [`wait_job`] polls `DescribeJobs` until the job
//! reaches a terminal status, with optional progress callbacks for UI updates.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::services::job::{DescribeJobsInput, Job};

/// Progress events emitted while waiting for a job
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { job_id: String },
    /// Polling iteration with current status
    Polling {
        job_id: String,
        status: String,
        elapsed: Duration,
    },
    Completed { job_id: String },
    Failed { job_id: String, status: String },
}

/// Callback type for progress updates
///
/// The CLI uses this for status lines; library callers usually pass `None`.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Terminal classification of a job status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    /// Classify a status string as reported by `DescribeJobs`
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "successful" => JobState::Succeeded,
            "failed" | "done with failure" => JobState::Failed,
            _ => JobState::Running,
        }
    }
}

/// Poll a job until it succeeds, fails or `timeout` elapses
///
/// # Example
///
/// ```rust,no_run
/// use iaasctl_core::{Client, ProgressEvent, wait_job};
/// use std::time::Duration;
///
/// # async fn example(client: Client) -> iaasctl_core::Result<()> {
/// let job = wait_job(
///     &client,
///     Some("pek3".to_string()),
///     "j-1234abcd",
///     Duration::from_secs(600),
///     Duration::from_secs(5),
///     Some(Box::new(|event: ProgressEvent| {
///         if let ProgressEvent::Polling { status, elapsed, .. } = event {
///             println!("{} ({:.0}s)", status, elapsed.as_secs());
///         }
///     })),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn wait_job(
    client: &Client,
    zone: Option<String>,
    job_id: &str,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<ProgressCallback>,
) -> Result<Job> {
    let start = Instant::now();
    let jobs = client.jobs(zone);
    let input = DescribeJobsInput {
        jobs: Some(vec![job_id.to_string()]),
        ..Default::default()
    };

    emit(
        &on_progress,
        ProgressEvent::Started {
            job_id: job_id.to_string(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        if elapsed > timeout {
            return Err(Error::JobTimeout {
                job_id: job_id.to_string(),
                timeout,
            });
        }

        let output = jobs.describe_jobs(&input).await?;
        let job = output
            .job_set
            .unwrap_or_default()
            .into_iter()
            .find(|j| j.job_id.as_deref() == Some(job_id));

        // A freshly created job can lag behind DescribeJobs
        let status = job
            .as_ref()
            .and_then(|j| j.status.clone())
            .unwrap_or_else(|| "pending".to_string());
        debug!("Job {} is {} after {:?}", job_id, status, elapsed);

        emit(
            &on_progress,
            ProgressEvent::Polling {
                job_id: job_id.to_string(),
                status: status.clone(),
                elapsed,
            },
        );

        match (JobState::from_status(&status), job) {
            (JobState::Succeeded, Some(job)) => {
                info!("Job {} succeeded after {:?}", job_id, elapsed);
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        job_id: job_id.to_string(),
                    },
                );
                return Ok(job);
            }
            (JobState::Failed, _) => {
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        job_id: job_id.to_string(),
                        status: status.clone(),
                    },
                );
                return Err(Error::JobFailed {
                    job_id: job_id.to_string(),
                    status,
                });
            }
            _ => tokio::time::sleep(interval).await,
        }
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
