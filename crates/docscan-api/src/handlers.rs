//! HTTP request handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use tracing::info;
use url::Url;

use docscan_models::{Job, JobId, JobStatus, OcrResult};

use crate::error::{ApiError, ApiResult};
use crate::metrics::names;
use crate::state::AppState;

/// Accepted upload content types.
const PDF_CONTENT_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// Response to a successful document submission.
#[derive(Serialize)]
pub struct ProcessResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
    pub file_name: String,
}

/// Job status projection.
///
/// Always carries the base fields; `result` appears once the job is
/// Completed, `error_message`/`retry_count` once it has Failed.
#[derive(Serialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OcrResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Job> for StatusResponse {
    fn from(job: Job) -> Self {
        let (result, error_message, retry_count, completed_at) = match job.status {
            JobStatus::Completed => (job.result, None, None, job.completed_at),
            JobStatus::Failed => (
                None,
                job.error_message,
                Some(job.retry_count),
                job.completed_at,
            ),
            _ => (None, None, None, None),
        };

        Self {
            job_id: job.id.to_string(),
            status: job.status,
            file_name: job.file_name,
            created_at: job.created_at,
            updated_at: job.updated_at,
            result,
            error_message,
            retry_count,
            completed_at,
        }
    }
}

/// Upload a PDF and queue it for OCR processing.
pub async fn process_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProcessResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut webhook_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                validate_pdf(&file_name, field.content_type())?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                upload = Some((file_name, data.to_vec()));
            }
            Some("webhook_url") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !value.is_empty() {
                    webhook_url = Some(validate_webhook_url(&value)?);
                }
            }
            _ => {}
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    let job_id = JobId::new();
    let file_path = state.artifacts.stage(&job_id, &file_name, &data).await?;

    let job = Job::with_id(job_id, file_name.clone(), file_path, webhook_url);
    state.store.insert(job.clone()).await?;
    state.dispatcher.dispatch(job.id.clone());

    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
    info!(job_id = %job.id, file_name = %file_name, "Queued job for processing");

    Ok(Json(ProcessResponse {
        job_id: job.id.to_string(),
        status: JobStatus::Pending,
        message: "PDF uploaded successfully and queued for processing".to_string(),
        file_name,
    }))
}

/// Get the status of a processing job.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let id = JobId::from_string(job_id);
    let job = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", id)))?;

    Ok(Json(StatusResponse::from(job)))
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

fn validate_pdf(file_name: &str, content_type: Option<&str>) -> ApiResult<()> {
    if let Some(content_type) = content_type {
        if !PDF_CONTENT_TYPES.contains(&content_type) {
            return Err(ApiError::bad_request(
                "Invalid file type. Only PDF files are accepted.",
            ));
        }
    }

    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::bad_request(
            "Invalid file extension. File must have .pdf extension.",
        ));
    }

    Ok(())
}

fn validate_webhook_url(value: &str) -> ApiResult<String> {
    let parsed =
        Url::parse(value).map_err(|_| ApiError::bad_request("webhook_url must be a valid URL"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::bad_request(
            "webhook_url must use http or https",
        ));
    }

    Ok(value.to_string())
}
