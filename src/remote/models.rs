// ABOUTME: Data structures for workflow job requests and outcomes
// ABOUTME: JobOutcome is the single classification produced per submission

use serde::Deserialize;
use serde_json::Value;

/// Everything needed for one submission to the workflow endpoint.
/// Built once from user input and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub image_bytes: Vec<u8>,
    pub image_name: String,
    pub image_mime_type: String,
    pub user_prompt: String,
}

/// Classification of a finished submission. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Workflow produced a substantial HTML artifact. `captured_at` is
    /// absent only on the bare-text fallback path, which carries no
    /// timestamp metadata.
    Success {
        html: String,
        captured_at: Option<String>,
    },
    /// Payload parsed but the content fell below the completeness
    /// threshold; carries diagnostics for triaging the upstream workflow.
    IncompleteResult {
        html_length: usize,
        react_length: usize,
        tailwind_key_count: usize,
        validation_info: Value,
        raw_html_prefix: String,
    },
    /// Timeout, connection failure, or unexpected status code.
    TransportError { message: String },
    /// 200 response whose body could not be interpreted as a result.
    MalformedResponse { message: String },
}

/// Status of a detached workflow execution, from `GET /executions/<id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub data: Option<ExecutionData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionData {
    #[serde(rename = "resultData")]
    pub result_data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStarted {
    #[serde(rename = "executionId")]
    pub execution_id: String,
}
