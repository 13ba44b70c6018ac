//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors a lifecycle run can surface to its dispatcher.
///
/// OCR failures never appear here: the engine converts them into the
/// job's Failed state. Webhook and cleanup failures are absorbed and
/// logged.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The job id has no backing record; caller bug or a race with
    /// deletion. Nothing was mutated.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// A concurrent run already holds the job. Nothing was mutated.
    #[error("Job already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Store error: {0}")]
    Store(#[from] docscan_store::StoreError),
}

impl WorkerError {
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::JobNotFound(id.into())
    }

    pub fn already_claimed(id: impl Into<String>) -> Self {
        Self::AlreadyClaimed(id.into())
    }
}
