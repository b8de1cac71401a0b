//! Tolerant extraction of structured records from free-form LLM completions.
//!
//! Completions arrive as prose-wrapped, fenced, or plain JSON — or as text
//! that conforms to no contract at all. Extraction tries an ordered list of
//! strategies and finally falls back to a safe default record, so a parse
//! failure can never break the conversation loop.

mod strategies;
mod tutor_reply;
mod word_lookup;

pub use tutor_reply::extract_tutor_reply;
pub use word_lookup::extract_word_lookup;

use serde_json::Value;

/// A record shape recoverable from completion text.
pub trait FromCompletion: Sized {
    /// Safe record returned when no strategy recovers a payload.
    fn fallback() -> Self;

    /// Read fields from a parsed payload. Each field carries its own
    /// default — one malformed field must not invalidate the others.
    fn from_value(value: &Value) -> Self;
}

/// Recover a `T` from raw completion text. Pure and synchronous; never fails.
pub fn extract<T: FromCompletion>(raw: &str) -> T {
    match strategies::extract_payload(raw) {
        Some(value) => T::from_value(&value),
        None => {
            tracing::debug!(chars = raw.len(), "no structured payload found, using defaults");
            T::fallback()
        }
    }
}
