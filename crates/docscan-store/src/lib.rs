//! Persistence collaborators for the job lifecycle engine.
//!
//! This crate provides:
//! - `JobStore`: job record persistence with an atomic claim operation
//! - `ArtifactStore`: staging and best-effort cleanup of uploaded documents

pub mod artifacts;
pub mod error;
pub mod job_store;

pub use artifacts::{ArtifactStore, LocalArtifactStore};
pub use error::{StoreError, StoreResult};
pub use job_store::{JobStore, MemoryJobStore};
