//! Job record persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use docscan_models::{Job, JobId, JobStatus};

use crate::error::{StoreError, StoreResult};

/// Persistence of job records.
///
/// `claim` is the commit point of the lifecycle: it atomically moves a job
/// from Pending to Processing, so exactly one concurrent caller wins the
/// right to process a given job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create the Pending record for a newly submitted job.
    async fn insert(&self, job: Job) -> StoreResult<()>;

    /// Load a job by id.
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Atomically transition `Pending -> Processing`.
    ///
    /// Returns `false` if the job is absent or not Pending.
    async fn claim(&self, id: &JobId) -> StoreResult<bool>;

    /// Persist the job's full current state.
    async fn save(&self, job: &Job) -> StoreResult<()>;
}

/// In-memory job store.
///
/// The default backing store for the service binary and tests; durable
/// persistence can be slotted in behind the same trait.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(job.id.as_str()) {
            return Err(StoreError::duplicate(job.id.as_str()));
        }
        debug!(job_id = %job.id, "Inserted job");
        jobs.insert(job.id.to_string(), job);
        Ok(())
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(id.as_str()).cloned())
    }

    async fn claim(&self, id: &JobId) -> StoreResult<bool> {
        // Check-and-set under the write lock so concurrent claims of the
        // same job serialize here.
        let mut jobs = self.jobs.write().await;
        match jobs.get(id.as_str()) {
            Some(job) if job.status == JobStatus::Pending => {
                let claimed = job.clone().start();
                jobs.insert(id.to_string(), claimed);
                debug!(job_id = %id, "Claimed job");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save(&self, job: &Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(job.id.as_str()) {
            return Err(StoreError::not_found(job.id.as_str()));
        }
        jobs.insert(job.id.to_string(), job.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use docscan_models::OcrResult;

    fn pending_job() -> Job {
        Job::new("scan.pdf", "/tmp/uploads/x_scan.pdf", None)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryJobStore::new();
        let job = pending_job();
        let id = job.id.clone();

        store.insert(job).await.unwrap();

        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Pending);
        assert_eq!(loaded.file_name, "scan.pdf");
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = MemoryJobStore::new();
        let job = pending_job();

        store.insert(job.clone()).await.unwrap();
        let err = store.insert(job).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_claim_transitions_to_processing() {
        let store = MemoryJobStore::new();
        let job = pending_job();
        let id = job.id.clone();
        store.insert(job).await.unwrap();

        assert!(store.claim(&id).await.unwrap());
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            JobStatus::Processing
        );

        // A second claim of the same job loses.
        assert!(!store.claim(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_absent_job() {
        let store = MemoryJobStore::new();
        assert!(!store.claim(&JobId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_terminal_job() {
        let store = MemoryJobStore::new();
        let job = pending_job().start().complete(OcrResult::from_text("x"));
        let id = job.id.clone();

        // Insert a job already in a terminal state.
        {
            let mut jobs = store.jobs.write().await;
            jobs.insert(id.to_string(), job);
        }

        assert!(!store.claim(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_claims_single_winner() {
        let store = Arc::new(MemoryJobStore::new());
        let job = pending_job();
        let id = job.id.clone();
        store.insert(job).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(tokio::spawn(async move { store.claim(&id).await.unwrap() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_save_unknown_job_errors() {
        let store = MemoryJobStore::new();
        let job = pending_job();

        let err = store.save(&job).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
