// ABOUTME: HTTP client for the remote wireframe-to-code workflow endpoint
// ABOUTME: Handles multipart submission, detached execution polling, and outcome classification

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use super::models::{ExecutionStarted, ExecutionStatus, JobOutcome, JobRequest};
use crate::artifact::{prefix, validate, COMPLETENESS_THRESHOLD};

/// Generous default: the upstream AI pipeline runs for many minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1500;

const DETACHED_SUBMIT_TIMEOUT_SECS: u64 = 30;
const STATUS_CHECK_TIMEOUT_SECS: u64 = 10;
const POLL_INTERVAL_SECS: u64 = 5;

pub struct WorkflowClient {
    client: Client,
    webhook_url: String,
    api_base_url: String,
}

impl WorkflowClient {
    pub fn new(webhook_url: String, api_base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            webhook_url,
            api_base_url,
        })
    }

    /// Submits the wireframe and blocks until the workflow responds or the
    /// timeout elapses. Every way this can go wrong maps to a `JobOutcome`
    /// variant; nothing is raised past this boundary.
    pub async fn submit(&self, request: &JobRequest) -> JobOutcome {
        debug!(
            image = %request.image_name,
            bytes = request.image_bytes.len(),
            "submitting wireframe to workflow endpoint"
        );

        let form = match build_form(request, false) {
            Ok(form) => form,
            Err(err) => {
                return JobOutcome::TransportError {
                    message: format!("failed to build upload form: {}", err),
                }
            }
        };

        let response = match self
            .client
            .post(&self.webhook_url)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(err),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return JobOutcome::TransportError {
                    message: format!("failed to read response body: {}", err),
                }
            }
        };

        if status != StatusCode::OK {
            return JobOutcome::TransportError {
                message: format!("status {}: {}", status.as_u16(), body),
            };
        }

        interpret_body(&body)
    }

    /// Fire-and-return variant: starts the workflow with `async=true` and
    /// returns the execution id without waiting for the pipeline.
    pub async fn submit_detached(&self, request: &JobRequest) -> Result<String> {
        let form = build_form(request, true).context("Failed to build upload form")?;

        let response = self
            .client
            .post(&self.webhook_url)
            .multipart(form)
            .timeout(Duration::from_secs(DETACHED_SUBMIT_TIMEOUT_SECS))
            .send()
            .await
            .context("Failed to start workflow. Ensure the endpoint is running and accessible")?;

        match response.status() {
            StatusCode::ACCEPTED => {
                let started: ExecutionStarted = response
                    .json()
                    .await
                    .context("Failed to parse execution id from workflow response")?;
                Ok(started.execution_id)
            }
            StatusCode::OK => response
                .text()
                .await
                .context("Failed to read execution id from workflow response"),
            status => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Workflow start failed with status {}: {}", status, body)
            }
        }
    }

    pub async fn execution_status(&self, execution_id: &str) -> Result<ExecutionStatus> {
        let url = format!("{}/executions/{}", self.api_base_url, execution_id);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(STATUS_CHECK_TIMEOUT_SECS))
            .send()
            .await
            .context("Failed to get execution status. The workflow service may be unavailable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to get execution status {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse execution status")
    }

    pub async fn poll_until_complete(
        &self,
        execution_id: &str,
        callback: impl Fn(&ExecutionStatus),
    ) -> Result<ExecutionStatus> {
        loop {
            let status = self.execution_status(execution_id).await?;
            callback(&status);

            if status.finished {
                return Ok(status);
            }
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
        }
    }
}

fn build_form(request: &JobRequest, detached: bool) -> reqwest::Result<Form> {
    let image = Part::bytes(request.image_bytes.clone())
        .file_name(request.image_name.clone())
        .mime_str(&request.image_mime_type)?;

    let mut form = Form::new()
        .part("image", image)
        .text("userprompt", request.user_prompt.clone());
    if detached {
        form = form.text("async", "true");
    }
    Ok(form)
}

fn transport_failure(err: reqwest::Error) -> JobOutcome {
    let message = if err.is_timeout() {
        "workflow exceeded time budget".to_string()
    } else if err.is_connect() {
        "endpoint unreachable".to_string()
    } else {
        err.to_string()
    };
    JobOutcome::TransportError { message }
}

/// Interprets a 200 body. Non-JSON bodies fall back to plain text: long
/// enough and it is taken as a bare HTML artifact, otherwise the response
/// is considered malformed.
pub fn interpret_body(body: &str) -> JobOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => interpret_value(value),
        Err(_) => {
            if body.len() < COMPLETENESS_THRESHOLD {
                JobOutcome::MalformedResponse {
                    message: format!(
                        "incomplete response ({} chars): {}",
                        body.len(),
                        prefix(body, 200)
                    ),
                }
            } else {
                JobOutcome::Success {
                    html: body.to_string(),
                    captured_at: None,
                }
            }
        }
    }
}

/// Unwraps a parsed payload into the result record and classifies it.
pub fn interpret_value(value: Value) -> JobOutcome {
    match unwrap_record(value) {
        Some(record) => validate(&record),
        None => JobOutcome::MalformedResponse {
            message: "unexpected response shape".to_string(),
        },
    }
}

/// The endpoint replies with either a single record or a one-element array
/// of records, optionally wrapping the real payload under a `json` key.
fn unwrap_record(value: Value) -> Option<Map<String, Value>> {
    let item = match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                return None;
            }
            items.remove(0)
        }
        other => other,
    };

    let mut record = match item {
        Value::Object(map) => map,
        _ => return None,
    };

    match record.remove("json") {
        Some(Value::Object(inner)) => Some(inner),
        Some(_) => None,
        None => Some(record),
    }
}
