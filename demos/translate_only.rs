//! Demonstrate the Gemini message adapter without a server.
//!
//! Usage:
//!   `cargo run --example translate_only`

use chat_relay::translate::gemini::{adapt_messages, gemini_to_unified};
use chat_relay::translate::gemini_types::{
    GenerateContentRequest, GenerateContentResponse, SAFETY_SETTINGS,
};
use chat_relay::translate::unified::ChatMessage;
use serde_json::json;

fn main() {
    // A conversation as a ChatGPT-style client would send it
    let messages: Vec<ChatMessage> = vec![
        ChatMessage::system("You are a geography expert. Be concise."),
        ChatMessage::assistant("Understood."),
        ChatMessage::user("What is the capital of France?"),
        ChatMessage::assistant("Paris."),
        json!({"role": "user", "content": [
            {"type": "text", "text": "And the one in this picture?"},
            {"type": "image_url", "image_url": {"url": "https://example.com/berlin.png"}}
        ]})
        .into(),
    ];

    let contents = adapt_messages(&messages);
    let request = GenerateContentRequest {
        contents: &contents,
        safety_settings: SAFETY_SETTINGS,
    };

    println!("=== Translated Request (Gemini format) ===");
    println!("{}", serde_json::to_string_pretty(&request).unwrap());

    // Simulate a Gemini reply and translate back
    let reply: GenerateContentResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "That is Berlin."}]},
            "finishReason": "STOP"
        }]
    }))
    .unwrap();

    println!();
    println!("=== Translated Response (unified format) ===");
    println!(
        "{}",
        serde_json::to_string_pretty(&gemini_to_unified(&reply).unwrap()).unwrap()
    );

    // A Gemini error body surfaces as an error, which the relay turns into a reply
    let failure: GenerateContentResponse = serde_json::from_value(json!({
        "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
    }))
    .unwrap();

    println!();
    println!("=== Upstream Error ===");
    match gemini_to_unified(&failure) {
        Ok(resp) => println!("unexpected success: {:?}", resp),
        Err(e) => println!("Gemini request failed: {}", e),
    }

    println!();
    println!("Done! The adapter works without any network calls.");
}
