//! Outcome webhook delivery.
//!
//! Best-effort, retried delivery of a JSON outcome payload to a
//! caller-supplied URL. Delivery failure is a boolean, never an error:
//! a webhook must not crash or stall the job pipeline.

pub mod notifier;

pub use notifier::{WebhookConfig, WebhookNotifier};
