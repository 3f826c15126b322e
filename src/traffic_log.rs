//! Traffic logging for XRPC calls
//!
//! Request and response bodies go to the `traffic` target as truncated
//! summaries so post text and blob contents never land in logs in full.

use serde::Serialize;
use tracing::{debug, trace, warn};

/// Maximum characters to log for content (to protect privacy)
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
pub(crate) fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(value: &impl Serialize) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

pub fn log_request(operation: &str, request: &impl Serialize) {
    debug!(target: "traffic", operation, "REQUEST {}", summarize(request));
}

pub fn log_upload(operation: &str, len: usize, mime_type: &str) {
    debug!(target: "traffic", operation, bytes = len, mime_type, "UPLOAD");
}

pub fn log_response(operation: &str, response: &impl Serialize) {
    trace!(target: "traffic", operation, "RESPONSE {}", summarize(response));
}

pub fn log_error(operation: &str, error: &str) {
    warn!(target: "traffic", operation, "ERROR {}", truncate_for_log(error, MAX_CONTENT_LOG_CHARS));
}
