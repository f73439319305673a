// ABOUTME: Classifies a parsed workflow record as a usable artifact or not
// ABOUTME: A length heuristic stands in for schema validation on purpose

use chrono::Local;
use serde_json::{Map, Value};

use crate::remote::models::JobOutcome;

/// Minimum html length treated as "the pipeline produced real output".
/// The upstream workflow's structured fields (react, tailwind, validation)
/// are unreliable placeholders, so content length is the only signal used.
pub const COMPLETENESS_THRESHOLD: usize = 500;

/// Characters of html carried into incomplete-result diagnostics.
const DIAGNOSTIC_PREFIX_CHARS: usize = 200;

/// Decides whether a result record is complete. Only ever returns
/// `Success` or `IncompleteResult`; missing fields fall back to empty
/// defaults rather than failing.
pub fn validate(record: &Map<String, Value>) -> JobOutcome {
    let html = record.get("html").and_then(Value::as_str).unwrap_or("");

    if html.len() > COMPLETENESS_THRESHOLD {
        return JobOutcome::Success {
            html: html.to_string(),
            captured_at: Some(current_timestamp()),
        };
    }

    let react = record.get("react").and_then(Value::as_str).unwrap_or("");
    let tailwind_key_count = record
        .get("tailwind")
        .and_then(Value::as_object)
        .map(Map::len)
        .unwrap_or(0);
    let validation_info = record
        .get("validation")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    JobOutcome::IncompleteResult {
        html_length: html.len(),
        react_length: react.len(),
        tailwind_key_count,
        validation_info,
        raw_html_prefix: prefix(html, DIAGNOSTIC_PREFIX_CHARS),
    }
}

pub fn current_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// First `max_chars` characters, respecting char boundaries.
pub fn prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
