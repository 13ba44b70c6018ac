//! Staged-artifact handling.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use docscan_models::JobId;

use crate::error::{StoreError, StoreResult};

/// Default staging directory.
const DEFAULT_UPLOAD_DIR: &str = "/tmp/uploads";

/// Default maximum upload size (10 MiB).
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Removal of staged input artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Best-effort removal of a staged artifact. A missing file is success.
    async fn delete(&self, path: &str) -> StoreResult<()>;
}

/// Filesystem staging area for uploaded documents.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
    max_file_size: usize,
}

impl LocalArtifactStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>, max_file_size: usize) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            max_file_size,
        })
    }

    /// Create from `UPLOAD_DIR` and `MAX_FILE_SIZE` environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string());
        let max_file_size = std::env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);
        Self::new(root, max_file_size)
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Staging directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitize an uploaded filename.
    ///
    /// Strips path components, replaces anything outside `[A-Za-z0-9._-]`
    /// with `_`, and forces a `.pdf` suffix.
    pub fn sanitize_filename(file_name: &str) -> String {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        let mut sanitized: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if !sanitized.to_lowercase().ends_with(".pdf") {
            sanitized.push_str(".pdf");
        }

        sanitized
    }

    /// Write an uploaded document to the staging area.
    ///
    /// Returns the staged path, `<root>/<job_id>_<sanitized-name>`.
    pub async fn stage(
        &self,
        job_id: &JobId,
        file_name: &str,
        data: &[u8],
    ) -> StoreResult<String> {
        if data.len() > self.max_file_size {
            return Err(StoreError::FileTooLarge {
                size: data.len(),
                max: self.max_file_size,
            });
        }

        let safe_name = Self::sanitize_filename(file_name);
        let path = self.root.join(format!("{}_{}", job_id, safe_name));

        tokio::fs::write(&path, data).await?;
        info!(path = %path.display(), job_id = %job_id, "Staged upload");

        Ok(path.to_string_lossy().into_owned())
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn delete(&self, path: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path, "Deleted staged file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path, "Staged file already gone");
                Ok(())
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
