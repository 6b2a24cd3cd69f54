//! The client-facing schema: what callers send and what they always get back.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// One conversation message, kept exactly as the caller sent it.
///
/// ChatGPT receives it untouched (string or part-array content, `null`
/// content, tool calls, names). Only the Gemini leg reads `role` and the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatMessage(Value);

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self(json!({ "role": role, "content": content.into() }))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A missing or non-string role reads as `Role::Other("")`.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::parse(self.0.get("role").and_then(Value::as_str).unwrap_or_default())
    }

    /// Plain text of the message: a string content as-is, or the `text` of
    /// every text part joined by newlines. Absent or `null` content is empty.
    #[must_use]
    pub fn text(&self) -> String {
        match self.0.get("content") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(parts)) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

impl From<Value> for ChatMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn parse(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: String,
}

impl ChatResponse {
    /// A single-choice response carrying `content` as the assistant's reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
            }],
        }
    }

    /// Errors are delivered to callers as ordinary assistant replies.
    pub fn error(message: impl Into<String>) -> Self {
        Self::assistant(message)
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// What the relay hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Chat(ChatResponse),
    /// A successful ChatGPT body, passed through without reshaping.
    Upstream(Value),
}

impl RelayResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Chat(ChatResponse::error(message))
    }

    /// The assistant content, for either variant when it has the unified shape.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            RelayResponse::Chat(resp) => resp.content(),
            RelayResponse::Upstream(body) => body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str),
        }
    }
}

impl From<ChatResponse> for RelayResponse {
    fn from(resp: ChatResponse) -> Self {
        Self::Chat(resp)
    }
}
