//! Translate unified chat messages into Gemini turns, and Gemini replies back.

use super::gemini_types::{GeminiRole, GeminiTurn, GenerateContentResponse};
use super::unified::{ChatMessage, ChatResponse, Role};
use super::UNKNOWN_ERROR;
use crate::error::{RelayError, Result};

/// Text of the model turn injected after the opening message.
pub const ACKNOWLEDGEMENT: &str = "好的";

/// Convert a unified conversation into Gemini turns.
///
/// The mapping is positional rather than role-driven:
///
/// * the first message always becomes a `user` turn and is followed by a
///   synthetic `model` acknowledgement, whatever its original role;
/// * an `assistant` message in second position is dropped, since the
///   acknowledgement already fills that slot (Gemini rejects two consecutive
///   `model` turns);
/// * everything else maps `assistant` to `model` and any other role to `user`.
pub fn adapt_messages(messages: &[ChatMessage]) -> Vec<GeminiTurn> {
    let mut turns = Vec::with_capacity(messages.len() + 1);

    for (index, msg) in messages.iter().enumerate() {
        match index {
            0 => {
                turns.push(GeminiTurn::text(GeminiRole::User, msg.text()));
                turns.push(GeminiTurn::text(GeminiRole::Model, ACKNOWLEDGEMENT));
            }
            1 if msg.role() == Role::Assistant => {}
            _ => {
                let role = match msg.role() {
                    Role::Assistant => GeminiRole::Model,
                    _ => GeminiRole::User,
                };
                turns.push(GeminiTurn::text(role, msg.text()));
            }
        }
    }

    turns
}

/// Pull the first candidate's text out of a Gemini reply.
///
/// Returns `RelayError::Upstream` carrying the bare detail; callers add the
/// provider prefix.
pub fn gemini_to_unified(resp: &GenerateContentResponse) -> Result<ChatResponse> {
    let Some(candidates) = resp.candidates.as_ref() else {
        let message = resp
            .error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .unwrap_or(UNKNOWN_ERROR);
        return Err(RelayError::upstream(message));
    };

    candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
        .map(ChatResponse::assistant)
        .ok_or_else(|| RelayError::upstream("response contained no candidate text"))
}
