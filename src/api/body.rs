//! Defensive extraction of error messages from failed responses.

use reqwest::Response;
use serde_json::Value;
use tracing::debug;

use crate::protocol::error_detail;

/// Structured `detail`/`message`, else the raw text, else `fallback`.
///
/// Only a body that is not JSON counts as raw text; JSON without a detail
/// gets `fallback`.
pub fn message_from_body(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return error_detail(&value).unwrap_or_else(|| fallback.to_string());
    }

    let text = body.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Consume a non-2xx response and turn its body into a message.
pub(crate) async fn failure_message(response: Response, fallback: &str) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => message_from_body(&body, fallback),
        Err(e) => {
            debug!(%status, error = %e, "could not read error body");
            fallback.to_string()
        }
    }
}
