//! Rate-limited client for the Typhoon OCR API.
//!
//! This crate provides:
//! - `ApiRateLimiter`: shared admission control for outbound OCR calls
//! - `OcrClient`: one OCR request per call, normalized errors

pub mod client;
pub mod error;
pub mod limiter;

pub use client::{OcrClient, OcrClientConfig};
pub use error::{ApiResult, OcrError};
pub use limiter::ApiRateLimiter;
