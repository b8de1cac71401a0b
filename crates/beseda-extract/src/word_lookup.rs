//! Word-card extraction. All fields default to empty rather than absent.

use serde_json::Value;

use beseda_core::types::WordLookup;

use crate::FromCompletion;

/// Extract a [`WordLookup`] from raw completion text.
pub fn extract_word_lookup(raw: &str) -> WordLookup {
    crate::extract(raw)
}

impl FromCompletion for WordLookup {
    fn fallback() -> Self {
        Self::default()
    }

    fn from_value(value: &Value) -> Self {
        Self {
            phonetic: string_or_empty(value, "phonetic"),
            examples: string_list(value, "examples"),
            translation: string_or_empty(value, "translation"),
        }
    }
}

fn string_or_empty(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Non-string entries are skipped, not fatal.
fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
