//! Job definitions for OCR processing.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::OcrResult;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle state.
///
/// Transitions form a directed acyclic path:
/// `Pending -> Processing -> {Completed | Failed}`. There is no
/// transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job exists, not yet claimed by a worker
    #[default]
    Pending,
    /// A worker has claimed the job and started the OCR call
    Processing,
    /// OCR returned a result
    Completed,
    /// OCR raised an error
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to OCR a staged document, tracked to a terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Original filename of the uploaded document
    pub file_name: String,

    /// Path to the staged input artifact (owned by the artifact store)
    pub file_path: String,

    /// Job state
    #[serde(default)]
    pub status: JobStatus,

    /// Outcome notification destination; immutable once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// OCR result; populated iff status is Completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OcrResult>,

    /// Diagnostic message; populated iff status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Set once, at the first terminal transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of failed processing attempts (observability only)
    #[serde(default)]
    pub retry_count: u32,
}

impl Job {
    /// Create a new Pending job for a staged document.
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        webhook_url: Option<String>,
    ) -> Self {
        Self::with_id(JobId::new(), file_name, file_path, webhook_url)
    }

    /// Create a new Pending job under a pre-allocated id.
    ///
    /// The submission path allocates the id first so the staged file can
    /// be named after it.
    pub fn with_id(
        id: JobId,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        webhook_url: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            file_name: file_name.into(),
            file_path: file_path.into(),
            status: JobStatus::Pending,
            webhook_url,
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            retry_count: 0,
        }
    }

    /// Start processing the job.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as completed with the OCR result.
    pub fn complete(mut self, result: OcrResult) -> Self {
        let now = Utc::now();
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(now);
        self.updated_at = now;
        self
    }

    /// Mark the job as failed.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        let now = Utc::now();
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.retry_count += 1;
        self.completed_at = Some(now);
        self.updated_at = now;
        self
    }

    /// Check whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
