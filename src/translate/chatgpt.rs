//! ChatGPT completions wire shapes.
//!
//! Requests go out in the unified message format unchanged. Responses are only
//! inspected for an `error` object; anything else is handed back verbatim.

use serde::Serialize;
use serde_json::Value;

use super::unified::ChatMessage;
use super::UNKNOWN_ERROR;

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

/// The upstream-reported error message, if the body carries an `error`.
#[must_use]
pub fn upstream_error_message(body: &Value) -> Option<String> {
    let error = body.get("error").filter(|e| !e.is_null())?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_ERROR);
    Some(message.to_string())
}
