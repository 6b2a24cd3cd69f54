use crate::error::{RelayError, Result};
use crate::logging::LogLevel;
use crate::providers::{ChatModel, Provider};
use crate::server::AppState;
use crate::translate::chatgpt::{upstream_error_message, CompletionRequest};
use crate::translate::gemini::{adapt_messages, gemini_to_unified};
use crate::translate::gemini_types::{
    GeminiTurn, GenerateContentRequest, GenerateContentResponse, SAFETY_SETTINGS,
};
use crate::translate::unified::{ChatMessage, ChatRequest, ChatResponse, RelayResponse};

use serde_json::{json, Value};
use std::time::Instant;
use uuid::Uuid;

pub const UNSUPPORTED_MODEL: &str = "unsupported chat_model type";

const BEARER_PREFIX: &str = "Bearer ";

/// Header values the relay reads from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct CallerCredentials {
    /// Checked against the allow-list.
    pub identity: Option<String>,
    /// Raw `Authorization` value carrying the caller's provider key.
    pub authorization: Option<String>,
}

/// Handle one inbound chat request end to end.
///
/// Never fails: every error is folded into an assistant-message envelope.
pub async fn route(state: &AppState, credentials: &CallerCredentials, body: &[u8]) -> RelayResponse {
    let request_id = Uuid::new_v4().to_string();

    if !state.guard.is_allowed(credentials.identity.as_deref()) {
        state.logger.log_with_context(
            LogLevel::Warn,
            "router",
            "Denied caller not on allow-list",
            json!({ "request_id": request_id }),
        );
        return RelayResponse::error(state.config.denied_message.as_str());
    }

    let req: ChatRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            // serde's message quotes offending values; only the caller sees it.
            state.logger.log_with_context(
                LogLevel::Warn,
                "router",
                "Failed to parse request",
                json!({
                    "request_id": request_id,
                    "error_kind": format!("{:?}", e.classify()).to_lowercase(),
                    "line": e.line(),
                    "column": e.column(),
                }),
            );
            return RelayResponse::error(format!("invalid request body: {}", e));
        }
    };

    let Some(model) = ChatModel::from_id(&req.model) else {
        state.logger.log_with_context(
            LogLevel::Warn,
            "router",
            "Unsupported model",
            json!({ "request_id": request_id, "model": req.model }),
        );
        return RelayResponse::error(UNSUPPORTED_MODEL);
    };

    tracing::debug!(
        request_id = %request_id,
        model = model.id,
        messages = req.messages.len(),
        "Dispatching chat request"
    );

    let started = Instant::now();
    let outcome = match model.provider {
        Provider::ChatGpt => {
            call_chatgpt(
                state,
                model.id,
                &req.messages,
                credentials.authorization.as_deref(),
            )
            .await
        }
        Provider::Gemini => match gemini_api_key(credentials.authorization.as_deref()) {
            Ok(api_key) => {
                let contents = adapt_messages(&req.messages);
                call_gemini(state, &contents, api_key)
                    .await
                    .map(RelayResponse::from)
            }
            Err(e) => Err(e),
        },
    };

    let context = json!({
        "request_id": request_id,
        "model": model.id,
        "provider": model.provider,
        "messages": req.messages.len(),
        "elapsed_ms": started.elapsed().as_millis() as u64,
    });

    match outcome {
        Ok(resp) => {
            state
                .logger
                .log_with_context(LogLevel::Info, "router", "Completed", context);
            resp
        }
        Err(e) => {
            let message = model.provider.failure(&e);
            state
                .logger
                .log_with_context(LogLevel::Warn, "router", message.as_str(), context);
            RelayResponse::error(message)
        }
    }
}

/// Send `{model, messages}` to the ChatGPT completions endpoint.
///
/// A body without an `error` object is handed back verbatim.
pub async fn call_chatgpt(
    state: &AppState,
    model: &str,
    messages: &[ChatMessage],
    authorization: Option<&str>,
) -> Result<RelayResponse> {
    let url = &state.config.upstream.chatgpt_url;
    let body = CompletionRequest { model, messages };

    tracing::debug!(%url, model, "POST chatgpt");

    let mut builder = state
        .client
        .post(url)
        .header("Content-Type", "application/json");
    if let Some(auth) = authorization {
        builder = builder.header("Authorization", auth);
    }

    let response = builder.json(&body).send().await?;
    let text = response.text().await?;
    let value: Value = serde_json::from_str(&text)?;

    if let Some(message) = upstream_error_message(&value) {
        return Err(RelayError::upstream(message));
    }

    Ok(RelayResponse::Upstream(value))
}

/// Send adapted turns to Gemini and wrap the first candidate as a chat reply.
pub async fn call_gemini(
    state: &AppState,
    contents: &[GeminiTurn],
    api_key: &str,
) -> Result<ChatResponse> {
    let url = &state.config.upstream.gemini_url;
    let body = GenerateContentRequest {
        contents,
        safety_settings: SAFETY_SETTINGS,
    };

    tracing::debug!(%url, turns = contents.len(), "POST gemini");

    // The key travels in the query string; strip URLs from transport errors so
    // it never reaches a reply or a log line.
    let response = state
        .client
        .post(url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| RelayError::Http(e.without_url()))?;
    let text = response
        .text()
        .await
        .map_err(|e| RelayError::Http(e.without_url()))?;
    let parsed: GenerateContentResponse = serde_json::from_str(&text)?;

    gemini_to_unified(&parsed)
}

/// Extract the Gemini API key from a `Bearer <key>` authorization value.
///
/// Fails closed: a missing scheme or an empty key is a credential error
/// rather than a silently truncated key.
pub fn gemini_api_key(authorization: Option<&str>) -> Result<&str> {
    authorization
        .and_then(|value| {
            let scheme = value.get(..BEARER_PREFIX.len())?;
            let key = value.get(BEARER_PREFIX.len()..)?;
            (scheme.eq_ignore_ascii_case(BEARER_PREFIX) && !key.trim().is_empty()).then_some(key)
        })
        .ok_or_else(|| RelayError::credential("authorization must be 'Bearer <api key>'"))
}
