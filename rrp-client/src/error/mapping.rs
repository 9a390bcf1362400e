//! Error mapping for HTTP failures of the WebApi endpoint
//!
//! This module converts non-success HTTP responses into normalized
//! [`ClientError`] values.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ClientError};

/// Extract a human-readable message from a JSON error body.
///
/// ASP.NET WebApi answers with `{"Message": ..., "ExceptionMessage": ...}`,
/// other hosts typically use `message` or `error`.
fn json_error_message(json: &Value) -> Option<&str> {
    ["ExceptionMessage", "Message", "message", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|m| m.as_str()))
}

/// Map a non-success HTTP response to a ClientError
pub fn map_http_error(
    status: StatusCode,
    body: &str,
    context: &mut ErrorContext,
) -> ClientError {
    context.status_code = Some(status.as_u16());
    context.add("category", classify_http_error(status));

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json_error_message(&json) {
            return match status {
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    ClientError::timeout(format!("{}: {}", status, message))
                }
                _ => ClientError::http(format!("{}: {}", status, message)),
            };
        }
    }

    // Fallback to status-based mapping
    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, crate::util::truncate_string(body, 100))
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ClientError::timeout(message),
        _ => ClientError::http(message),
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
