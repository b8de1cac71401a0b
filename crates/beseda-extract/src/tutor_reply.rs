//! Tutor reply extraction with field-level defaults.

use serde_json::Value;

use beseda_core::types::{Correction, PronunciationTip, TutorReply, VocabularyTip};

use crate::FromCompletion;

// Generic filler shown (and spoken) when the completion gave us nothing
// usable. The parenthesized glosses are stripped before synthesis.
const DEFAULT_REPLY: &str = "Отлично, продолжаем! (Great, let's continue!)";
const DEFAULT_FOLLOW_UP: &str = "Расскажи мне ещё что-нибудь. (Tell me something else.)";

/// Extract a [`TutorReply`] from raw completion text. Never fails: malformed
/// input degrades to field-level or whole-record defaults.
pub fn extract_tutor_reply(raw: &str) -> TutorReply {
    crate::extract(raw)
}

impl FromCompletion for TutorReply {
    fn fallback() -> Self {
        Self {
            reply: DEFAULT_REPLY.into(),
            corrections: None,
            vocabulary_tip: None,
            pronunciation_tip: None,
            follow_up: DEFAULT_FOLLOW_UP.into(),
        }
    }

    fn from_value(value: &Value) -> Self {
        Self {
            reply: non_empty_string(value, "reply").unwrap_or_else(|| DEFAULT_REPLY.into()),
            corrections: corrections(value),
            vocabulary_tip: vocabulary_tip(value),
            pronunciation_tip: pronunciation_tip(value),
            follow_up: non_empty_string(value, "followUp")
                .unwrap_or_else(|| DEFAULT_FOLLOW_UP.into()),
        }
    }
}

fn non_empty_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Kept only when it parses as a non-empty list; malformed entries are
/// dropped individually.
fn corrections(value: &Value) -> Option<Vec<Correction>> {
    let entries = value.get("corrections")?.as_array()?;
    let parsed: Vec<Correction> = entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

fn vocabulary_tip(value: &Value) -> Option<VocabularyTip> {
    let tip = value.get("vocabularyTip")?;
    if !tip.is_object() {
        return None;
    }
    serde_json::from_value::<VocabularyTip>(tip.clone())
        .ok()
        .filter(|t| !t.word.is_empty())
}

fn pronunciation_tip(value: &Value) -> Option<PronunciationTip> {
    let tip = value.get("pronunciationTip")?;
    if !tip.is_object() {
        return None;
    }
    serde_json::from_value::<PronunciationTip>(tip.clone())
        .ok()
        .filter(|t| !t.word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_no_optional_fields() {
        let raw = r#"{"reply": "Молодец!", "followUp": "Что ты делал вчера?"}"#;
        let reply = extract_tutor_reply(raw);
        assert_eq!(reply.reply, "Молодец!");
        assert_eq!(reply.follow_up, "Что ты делал вчера?");
        assert!(reply.corrections.is_none());
        assert!(reply.vocabulary_tip.is_none());
        assert!(reply.pronunciation_tip.is_none());
    }

    #[test]
    fn test_no_braces_returns_defaults() {
        let reply = extract_tutor_reply("I'm sorry, I can't format that as requested.");
        assert_eq!(reply, TutorReply::fallback());
    }

    #[test]
    fn test_malformed_corrections_does_not_poison_reply() {
        let raw = r#"{"reply": "Хорошо!", "followUp": "Дальше?", "corrections": "none needed"}"#;
        let reply = extract_tutor_reply(raw);
        assert_eq!(reply.reply, "Хорошо!");
        assert!(reply.corrections.is_none());
    }

    #[test]
    fn test_malformed_correction_entries_dropped_individually() {
        let raw = r#"{
            "reply": "Почти!",
            "followUp": "Ещё раз?",
            "corrections": [
                {"original": "я пошла", "corrected": "я пошёл", "explanation": "gender agreement"},
                "not an object",
                {"missing": "fields"}
            ]
        }"#;
        let reply = extract_tutor_reply(raw);
        let corrections = reply.corrections.unwrap();
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].corrected, "я пошёл");
    }

    #[test]
    fn test_empty_corrections_list_omitted() {
        let raw = r#"{"reply": "Верно!", "followUp": "Далее?", "corrections": []}"#;
        assert!(extract_tutor_reply(raw).corrections.is_none());
    }

    #[test]
    fn test_wrong_typed_reply_defaults_independently() {
        let raw = r#"{"reply": 42, "followUp": "А что потом?"}"#;
        let reply = extract_tutor_reply(raw);
        assert_eq!(reply.reply, DEFAULT_REPLY);
        assert_eq!(reply.follow_up, "А что потом?");
    }

    #[test]
    fn test_vocabulary_tip_kept_when_object_shaped() {
        let raw = r#"{
            "reply": "Да!",
            "followUp": "?",
            "vocabularyTip": {"word": "собака", "definition": "dog", "examples": ["У меня есть собака"]}
        }"#;
        let tip = extract_tutor_reply(raw).vocabulary_tip.unwrap();
        assert_eq!(tip.word, "собака");
        assert_eq!(tip.examples.len(), 1);
    }

    #[test]
    fn test_non_object_tips_omitted() {
        let raw = r#"{"reply": "Да", "followUp": "?", "vocabularyTip": "собака", "pronunciationTip": 7}"#;
        let reply = extract_tutor_reply(raw);
        assert!(reply.vocabulary_tip.is_none());
        assert!(reply.pronunciation_tip.is_none());
    }

    #[test]
    fn test_prose_wrapped_completion() {
        let raw = "Here's my response:\n{\"reply\": \"Привет!\", \"followUp\": \"Как дела?\"} \nLet me know!";
        let reply = extract_tutor_reply(raw);
        assert_eq!(reply.reply, "Привет!");
        assert_eq!(reply.follow_up, "Как дела?");
    }
}
