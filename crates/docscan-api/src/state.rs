//! Application state.

use std::sync::Arc;

use docscan_ocr::OcrClient;
use docscan_store::{ArtifactStore, JobStore, LocalArtifactStore, MemoryJobStore};
use docscan_webhook::WebhookNotifier;
use docscan_worker::{JobDispatcher, JobLifecycleEngine, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub artifacts: Arc<LocalArtifactStore>,
    pub dispatcher: Arc<JobDispatcher>,
}

impl AppState {
    /// Create new application state from the environment.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let artifacts = Arc::new(LocalArtifactStore::from_env()?);
        let ocr = Arc::new(OcrClient::from_env()?);
        let notifier = Arc::new(WebhookNotifier::from_env()?);

        let engine = Arc::new(JobLifecycleEngine::new(
            Arc::clone(&store),
            Arc::clone(&artifacts) as Arc<dyn ArtifactStore>,
            ocr,
            notifier,
        ));
        let dispatcher = Arc::new(JobDispatcher::new(engine, WorkerConfig::from_env()));

        Ok(Self {
            config,
            store,
            artifacts,
            dispatcher,
        })
    }
}
