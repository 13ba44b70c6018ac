//! Webhook notifier.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info, warn};

use docscan_models::WebhookPayload;

/// Webhook delivery configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Ceiling on a single delivery attempt
    pub timeout: Duration,
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// First backoff delay; doubles each attempt
    pub backoff_base: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl WebhookConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_secs(
                std::env::var("WEBHOOK_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_retries: std::env::var("WEBHOOK_RETRY_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            backoff_base: Duration::from_secs(2),
        }
    }
}

/// Delivers job outcome payloads to caller-supplied URLs.
///
/// Owns one shared connection pool reused across deliveries.
pub struct WebhookNotifier {
    http: Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    /// Create a new notifier.
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, reqwest::Error> {
        Self::new(WebhookConfig::from_env())
    }

    /// Backoff delay before the retry following `attempt` (0-based).
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config.backoff_base.saturating_mul(2u32.pow(attempt))
    }

    /// Deliver a payload to `url`.
    ///
    /// Returns `true` once a 2xx response is received. Server errors
    /// (status >= 500) and transport failures are retried up to
    /// `max_retries` more times with exponential backoff; other non-2xx
    /// responses fail immediately. An empty URL is a no-op returning
    /// `false`. This method never returns an error and never panics.
    pub async fn notify(&self, url: &str, payload: &WebhookPayload) -> bool {
        if url.is_empty() {
            warn!("No webhook URL provided");
            return false;
        }

        let total = self.config.max_retries + 1;
        for attempt in 0..total {
            info!(url, attempt = attempt + 1, total, "Sending webhook");

            match self.http.post(url).json(payload).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(url, "Successfully sent webhook");
                    return true;
                }
                Ok(response) if response.status().is_server_error() => {
                    error!(url, status = %response.status(), "Webhook delivery failed");
                }
                Ok(response) => {
                    // 4xx-class rejection; retrying will not help.
                    error!(url, status = %response.status(), "Webhook rejected, not retrying");
                    return false;
                }
                Err(e) => {
                    error!(url, error = %e, "Network error sending webhook");
                }
            }

            if attempt + 1 < total {
                let delay = self.backoff_delay(attempt);
                debug!(url, ?delay, "Backing off before webhook retry");
                tokio::time::sleep(delay).await;
            }
        }

        warn!(url, "Webhook delivery exhausted retries");
        false
    }
}
