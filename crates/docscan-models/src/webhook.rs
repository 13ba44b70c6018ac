//! Webhook outcome payload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Job, JobStatus, OcrResult};

/// JSON body delivered to a job's webhook URL once the job is terminal.
///
/// All four keys are always present on the wire; `result` and
/// `error_message` are `null` rather than omitted when unset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebhookPayload {
    pub job_id: String,
    pub status: JobStatus,
    pub result: Option<OcrResult>,
    pub error_message: Option<String>,
}

impl WebhookPayload {
    /// Payload for a successfully completed job.
    pub fn completed(job_id: impl Into<String>, result: OcrResult) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            result: Some(result),
            error_message: None,
        }
    }

    /// Payload for a failed job.
    pub fn failed(job_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            result: None,
            error_message: Some(error_message.into()),
        }
    }

    /// Build the outcome payload for a terminal job.
    ///
    /// Returns `None` while the job is still Pending or Processing.
    pub fn for_job(job: &Job) -> Option<Self> {
        match job.status {
            JobStatus::Completed => Some(Self {
                job_id: job.id.to_string(),
                status: JobStatus::Completed,
                result: job.result.clone(),
                error_message: None,
            }),
            JobStatus::Failed => Some(Self {
                job_id: job.id.to_string(),
                status: JobStatus::Failed,
                result: None,
                error_message: job.error_message.clone(),
            }),
            JobStatus::Pending | JobStatus::Processing => None,
        }
    }
}
