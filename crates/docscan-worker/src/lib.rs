//! Job lifecycle engine.
//!
//! This crate provides:
//! - `JobLifecycleEngine`: drives one job from claim to terminal state,
//!   invoking the OCR client and webhook notifier
//! - `JobDispatcher`: concurrency-capped background execution with
//!   graceful drain

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;

pub use config::WorkerConfig;
pub use dispatcher::JobDispatcher;
pub use engine::JobLifecycleEngine;
pub use error::{WorkerError, WorkerResult};
