//! Axum HTTP API server for the DocScan OCR service.
//!
//! This crate provides:
//! - Document upload and job submission
//! - Job status queries
//! - Health and metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
