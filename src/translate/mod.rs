//! Translation between the unified chat schema and each provider's native schema.
//!
//! All translation functions are pure (no I/O).

pub mod chatgpt;
pub mod gemini;
pub mod gemini_types;
pub mod unified;

/// Substituted whenever an upstream reports a failure without a message.
pub const UNKNOWN_ERROR: &str = "unknown error";
