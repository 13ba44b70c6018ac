//! Background job dispatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info};

use docscan_models::JobId;

use crate::config::WorkerConfig;
use crate::engine::JobLifecycleEngine;

/// Runs lifecycle engine executions as background tasks, capping how many
/// are in flight at once.
///
/// The submission path hands a job id over and returns immediately; the
/// spawned task waits for a concurrency slot before claiming the job.
pub struct JobDispatcher {
    engine: Arc<JobLifecycleEngine>,
    semaphore: Arc<Semaphore>,
    config: WorkerConfig,
}

impl JobDispatcher {
    /// Create a new dispatcher.
    pub fn new(engine: Arc<JobLifecycleEngine>, config: WorkerConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            engine,
            semaphore,
            config,
        }
    }

    /// Schedule a lifecycle run for `job_id` and return immediately.
    pub fn dispatch(&self, job_id: JobId) {
        let engine = Arc::clone(&self.engine);
        let semaphore = Arc::clone(&self.semaphore);

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!(job_id = %job_id, "Dispatcher shut down; job left pending");
                    return;
                }
            };

            match engine.run(&job_id).await {
                Ok(status) => {
                    info!(job_id = %job_id, status = %status, "Job finished");
                }
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Job run aborted");
                }
            }
        });
    }

    /// Wait for in-flight jobs to finish, up to the shutdown timeout.
    pub async fn shutdown(&self) {
        info!("Waiting for in-flight jobs to complete...");
        if tokio::time::timeout(self.config.shutdown_timeout, self.drain())
            .await
            .is_err()
        {
            error!("Shutdown timeout elapsed with jobs still in flight");
        }
        self.semaphore.close();
    }

    async fn drain(&self) {
        loop {
            if self.semaphore.available_permits() == self.config.max_concurrent_jobs {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
