//! The two upstream providers and the chat models routed to each.
//!
//! Model ids are matched after trimming and lower-casing; anything outside the
//! table is unsupported.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    ChatGpt,
    Gemini,
}

impl Provider {
    #[must_use]
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::ChatGpt => "https://api.openai.com/v1/chat/completions",
            Provider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
            }
        }
    }

    /// Prefix of every error message surfaced for this provider.
    #[must_use]
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Provider::ChatGpt => "ChatGPT request failed: ",
            Provider::Gemini => "Gemini request failed: ",
        }
    }

    #[must_use]
    pub fn failure(self, detail: impl std::fmt::Display) -> String {
        format!("{}{}", self.failure_prefix(), detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatModel {
    pub id: &'static str,
    pub provider: Provider,
}

const MODELS: &[ChatModel] = &[
    ChatModel {
        id: "gpt-3.5-turbo",
        provider: Provider::ChatGpt,
    },
    ChatModel {
        id: "gpt-4",
        provider: Provider::ChatGpt,
    },
    ChatModel {
        id: "gemini-pro",
        provider: Provider::Gemini,
    },
    ChatModel {
        id: "gemini",
        provider: Provider::Gemini,
    },
];

impl ChatModel {
    #[must_use]
    pub fn from_id(id: &str) -> Option<&'static ChatModel> {
        let normalized = id.trim().to_lowercase();
        MODELS.iter().find(|m| m.id == normalized)
    }

    #[must_use]
    pub fn all() -> &'static [ChatModel] {
        MODELS
    }
}
