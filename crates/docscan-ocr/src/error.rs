//! OCR client error types.

use thiserror::Error;

pub type ApiResult<T> = Result<T, OcrError>;

#[derive(Debug, Error)]
pub enum OcrError {
    /// Non-2xx response from the OCR API.
    #[error("Typhoon OCR API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure, including the request timeout ceiling.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response whose body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration (e.g. an unusable API key header).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read the staged input file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
