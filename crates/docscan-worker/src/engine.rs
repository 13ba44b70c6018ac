//! Job lifecycle engine.

use std::sync::Arc;

use metrics::counter;
use tracing::{error, info, warn};

use docscan_models::{JobId, JobStatus, WebhookPayload};
use docscan_ocr::OcrClient;
use docscan_store::{ArtifactStore, JobStore};
use docscan_webhook::WebhookNotifier;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "docscan_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "docscan_jobs_failed_total";
    pub const WEBHOOK_FAILURES_TOTAL: &str = "docscan_webhook_failures_total";
}

/// Drives one job from claim to terminal state.
///
/// Claiming (the `Pending -> Processing` write) is the commit point; once
/// a run holds the claim, the job always ends Completed or Failed unless
/// the process dies. OCR errors become the Failed state, webhook and
/// cleanup failures are absorbed, so no error from those collaborators
/// can leave a claimed job non-terminal.
pub struct JobLifecycleEngine {
    store: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    ocr: Arc<OcrClient>,
    notifier: Arc<WebhookNotifier>,
}

impl JobLifecycleEngine {
    /// Create a new engine over its collaborators.
    pub fn new(
        store: Arc<dyn JobStore>,
        artifacts: Arc<dyn ArtifactStore>,
        ocr: Arc<OcrClient>,
        notifier: Arc<WebhookNotifier>,
    ) -> Self {
        Self {
            store,
            artifacts,
            ocr,
            notifier,
        }
    }

    /// Run one job to a terminal state and report that state.
    pub async fn run(&self, job_id: &JobId) -> WorkerResult<JobStatus> {
        info!(job_id = %job_id, "Starting OCR processing");

        let Some(job) = self.store.get(job_id).await? else {
            error!(job_id = %job_id, "Job not found");
            return Err(WorkerError::job_not_found(job_id.as_str()));
        };

        if !self.store.claim(job_id).await? {
            warn!(job_id = %job_id, "Lost the claim; another run owns this job");
            return Err(WorkerError::already_claimed(job_id.as_str()));
        }
        let job = job.start();

        // Any OCR failure terminates this job only; it must never escape
        // the engine.
        let job = match self.ocr.process(&job.file_path, None).await {
            Ok(result) => {
                info!(job_id = %job_id, "Successfully completed OCR");
                job.complete(result)
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "OCR processing failed");
                job.fail(e.to_string())
            }
        };

        // The single terminal write: status, outcome fields, and
        // completed_at land together.
        self.store.save(&job).await?;

        match job.status {
            JobStatus::Completed => counter!(names::JOBS_COMPLETED_TOTAL).increment(1),
            JobStatus::Failed => counter!(names::JOBS_FAILED_TOTAL).increment(1),
            _ => {}
        }

        self.notify_outcome(&job).await;

        if let Err(e) = self.artifacts.delete(&job.file_path).await {
            warn!(job_id = %job_id, path = %job.file_path, error = %e, "Failed to delete staged file");
        }

        Ok(job.status)
    }

    /// Best-effort outcome notification; never touches job state.
    async fn notify_outcome(&self, job: &docscan_models::Job) {
        let Some(url) = job.webhook_url.as_deref() else {
            return;
        };
        let Some(payload) = WebhookPayload::for_job(job) else {
            return;
        };

        if !self.notifier.notify(url, &payload).await {
            warn!(job_id = %job.id, url, "Webhook delivery failed");
            counter!(names::WEBHOOK_FAILURES_TOTAL).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use docscan_models::Job;
    use docscan_ocr::OcrClientConfig;
    use docscan_store::{LocalArtifactStore, MemoryJobStore, StoreError, StoreResult};
    use docscan_webhook::WebhookConfig;

    use super::*;

    struct Fixture {
        _upload_dir: tempfile::TempDir,
        store: Arc<MemoryJobStore>,
        artifacts: Arc<LocalArtifactStore>,
        engine: JobLifecycleEngine,
    }

    fn fixture(ocr_server: &MockServer) -> Fixture {
        let upload_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryJobStore::new());
        let artifacts =
            Arc::new(LocalArtifactStore::new(upload_dir.path(), 1024 * 1024).unwrap());

        let ocr = Arc::new(
            OcrClient::new(OcrClientConfig {
                api_url: ocr_server.uri(),
                api_key: "test-key".to_string(),
                rate_limit: 100,
                ..Default::default()
            })
            .unwrap(),
        );
        let notifier = Arc::new(
            WebhookNotifier::new(WebhookConfig {
                max_retries: 0,
                backoff_base: std::time::Duration::from_millis(1),
                ..Default::default()
            })
            .unwrap(),
        );

        let engine = JobLifecycleEngine::new(
            Arc::clone(&store) as Arc<dyn JobStore>,
            Arc::clone(&artifacts) as Arc<dyn ArtifactStore>,
            ocr,
            notifier,
        );

        Fixture {
            _upload_dir: upload_dir,
            store,
            artifacts,
            engine,
        }
    }

    async fn staged_job(fx: &Fixture, webhook_url: Option<String>) -> Job {
        let id = JobId::new();
        let file_path = fx
            .artifacts
            .stage(&id, "scan.pdf", b"%PDF-1.4 test")
            .await
            .unwrap();
        let job = Job::with_id(id, "scan.pdf", file_path, webhook_url);
        fx.store.insert(job.clone()).await.unwrap();
        job
    }

    #[tokio::test]
    async fn test_run_completes_job_and_cleans_up() {
        let ocr_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "hello" })),
            )
            .mount(&ocr_server)
            .await;

        let webhook_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&webhook_server)
            .await;

        let fx = fixture(&ocr_server);
        let job = staged_job(&fx, Some(format!("{}/hook", webhook_server.uri()))).await;

        let status = fx.engine.run(&job.id).await.unwrap();
        assert_eq!(status, JobStatus::Completed);

        let stored = fx.store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert_eq!(stored.result.as_ref().unwrap().text(), Some("hello".to_string()));
        assert!(stored.completed_at.is_some());
        assert!(stored.error_message.is_none());

        // Staged input is gone regardless of outcome.
        assert!(!Path::new(&job.file_path).exists());

        // Webhook carried the completed outcome.
        let requests = webhook_server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["job_id"], job.id.as_str());
        assert_eq!(body["status"], "completed");
        assert_eq!(body["result"]["text"], "hello");
        assert!(body["error_message"].is_null());
    }

    #[tokio::test]
    async fn test_run_converts_api_error_to_failed() {
        let ocr_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .mount(&ocr_server)
            .await;

        let webhook_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&webhook_server)
            .await;

        let fx = fixture(&ocr_server);
        let job = staged_job(&fx, Some(webhook_server.uri())).await;

        let status = fx.engine.run(&job.id).await.unwrap();
        assert_eq!(status, JobStatus::Failed);

        let stored = fx.store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert!(stored.error_message.as_ref().unwrap().contains("500"));
        assert_eq!(stored.retry_count, 1);
        assert!(stored.completed_at.is_some());
        assert!(stored.result.is_none());
        assert!(!Path::new(&job.file_path).exists());

        let requests = webhook_server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["status"], "failed");
        assert!(body["result"].is_null());
        assert!(body["error_message"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_run_unknown_job() {
        let ocr_server = MockServer::start().await;
        let fx = fixture(&ocr_server);

        let err = fx.engine.run(&JobId::new()).await.unwrap_err();
        assert!(matches!(err, WorkerError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_lost_claim_leaves_job_untouched() {
        let ocr_server = MockServer::start().await;
        let fx = fixture(&ocr_server);
        let job = staged_job(&fx, None).await;

        // A concurrent run already claimed the job.
        assert!(fx.store.claim(&job.id).await.unwrap());

        let err = fx.engine.run(&job.id).await.unwrap_err();
        assert!(matches!(err, WorkerError::AlreadyClaimed(_)));

        let stored = fx.store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Processing);
        assert!(stored.result.is_none());
        assert!(Path::new(&job.file_path).exists());
    }

    #[tokio::test]
    async fn test_webhook_failure_does_not_change_status() {
        let ocr_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "ok" })),
            )
            .mount(&ocr_server)
            .await;

        let webhook_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&webhook_server)
            .await;

        let fx = fixture(&ocr_server);
        let job = staged_job(&fx, Some(webhook_server.uri())).await;

        let status = fx.engine.run(&job.id).await.unwrap();
        assert_eq!(status, JobStatus::Completed);
        assert_eq!(
            fx.store.get(&job.id).await.unwrap().unwrap().status,
            JobStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_save_failure_propagates() {
        use async_trait::async_trait;

        mockall::mock! {
            Store {}

            #[async_trait]
            impl JobStore for Store {
                async fn insert(&self, job: Job) -> StoreResult<()>;
                async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;
                async fn claim(&self, id: &JobId) -> StoreResult<bool>;
                async fn save(&self, job: &Job) -> StoreResult<()>;
            }
        }

        let ocr_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "ok" })),
            )
            .mount(&ocr_server)
            .await;

        let upload_dir = tempfile::tempdir().unwrap();
        let artifacts =
            Arc::new(LocalArtifactStore::new(upload_dir.path(), 1024 * 1024).unwrap());

        let id = JobId::new();
        let file_path = artifacts.stage(&id, "scan.pdf", b"%PDF-1.4").await.unwrap();
        let job = Job::with_id(id.clone(), "scan.pdf", file_path, None);

        // The terminal save fails; get/claim behave.
        let mut store = MockStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(job.clone())));
        store.expect_claim().returning(|_| Ok(true));
        store
            .expect_save()
            .returning(|_| Err(StoreError::not_found("save is broken")));

        let engine = JobLifecycleEngine::new(
            Arc::new(store),
            artifacts,
            Arc::new(
                OcrClient::new(OcrClientConfig {
                    api_url: ocr_server.uri(),
                    api_key: "k".to_string(),
                    rate_limit: 100,
                    ..Default::default()
                })
                .unwrap(),
            ),
            Arc::new(WebhookNotifier::new(WebhookConfig::default()).unwrap()),
        );

        let err = engine.run(&id).await.unwrap_err();
        assert!(matches!(err, WorkerError::Store(_)));
    }
}
