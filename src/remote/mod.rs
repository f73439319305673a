// ABOUTME: Remote workflow endpoint integration
// ABOUTME: Submission client plus the wire models it speaks

pub mod client;
pub mod models;

pub use client::{WorkflowClient, DEFAULT_TIMEOUT_SECS};
pub use models::{JobOutcome, JobRequest};
