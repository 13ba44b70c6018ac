//! Typhoon OCR HTTP client.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, error, info};

use docscan_models::OcrResult;

use crate::error::{ApiResult, OcrError};
use crate::limiter::{ApiRateLimiter, DEFAULT_RATE_PER_SECOND};

/// Configuration for the OCR client.
#[derive(Debug, Clone)]
pub struct OcrClientConfig {
    /// OCR API endpoint
    pub api_url: String,
    /// Bearer token for the API
    pub api_key: String,
    /// Hard ceiling on one processing round trip
    pub timeout: Duration,
    /// Ceiling on auxiliary status lookups
    pub status_timeout: Duration,
    /// Admitted call-starts per second, shared across all callers
    pub rate_limit: u32,
}

impl Default for OcrClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.opentyphoon.ai/v1/ocr".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(300), // 5 minutes for large documents
            status_timeout: Duration::from_secs(30),
            rate_limit: DEFAULT_RATE_PER_SECOND,
        }
    }
}

impl OcrClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("TYPHOON_API_URL")
                .unwrap_or_else(|_| "https://api.opentyphoon.ai/v1/ocr".to_string()),
            api_key: std::env::var("TYPHOON_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("TYPHOON_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            status_timeout: Duration::from_secs(30),
            rate_limit: std::env::var("TYPHOON_RATE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RATE_PER_SECOND),
        }
    }
}

/// Client for the Typhoon OCR API.
///
/// Owns one shared connection pool; every request first acquires a slot
/// from the rate limiter.
pub struct OcrClient {
    http: Client,
    limiter: ApiRateLimiter,
    config: OcrClientConfig,
}

impl OcrClient {
    /// Create a new OCR client.
    pub fn new(config: OcrClientConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| OcrError::config("API key is not a valid header value"))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(OcrError::Network)?;

        let limiter = ApiRateLimiter::new(config.rate_limit);

        Ok(Self {
            http,
            limiter,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(OcrClientConfig::from_env())
    }

    /// Run one document through the OCR API.
    ///
    /// Acquires a rate-limiter slot, uploads the staged file as multipart
    /// form data, and waits up to the configured ceiling for the parsed
    /// result. Optional key-value options are sent as extra form fields.
    pub async fn process(
        &self,
        pdf_path: &str,
        options: Option<&HashMap<String, String>>,
    ) -> ApiResult<OcrResult> {
        self.limiter.acquire().await;

        info!(path = pdf_path, "Processing document");

        let data = tokio::fs::read(pdf_path).await?;
        let file_name = Path::new(pdf_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        let file_part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(OcrError::Network)?;

        let mut form = Form::new().part("file", file_part);
        if let Some(options) = options {
            for (key, value) in options {
                form = form.text(key.clone(), value.clone());
            }
        }

        let response = self
            .http
            .post(&self.config.api_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            error!(status, path = pdf_path, "OCR API returned an error");
            return Err(OcrError::api(status, message));
        }

        let result: OcrResult = response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

        info!(path = pdf_path, "Successfully processed document");
        Ok(result)
    }

    /// Look up a job on the OCR API side.
    pub async fn job_status(&self, job_id: &str) -> ApiResult<serde_json::Value> {
        self.limiter.acquire().await;

        let url = format!("{}/jobs/{}", self.config.api_url, job_id);
        debug!(url = %url, "Fetching remote job status");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.status_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(OcrError::api(status, message));
        }

        response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))
    }
}
