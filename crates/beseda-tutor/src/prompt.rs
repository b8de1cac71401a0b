//! System prompt builders for the tutoring persona.

use serde::{Deserialize, Serialize};

/// Self-reported proficiency, used to tune how much Russian the tutor mixes
/// into its replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl StudentLevel {
    fn guidance(&self) -> &'static str {
        match self {
            Self::Beginner => {
                "Use mostly English with short, simple Russian phrases. \
                 Add a transliteration in parentheses after each Russian phrase."
            }
            Self::Intermediate => {
                "Mix Russian and English roughly evenly. Introduce new vocabulary \
                 in context and correct recurring mistakes."
            }
            Self::Advanced => {
                "Reply mostly in Russian, switching to English only to explain \
                 subtle grammar points."
            }
        }
    }
}

/// Build the system prompt for a tutoring conversation.
pub fn build_tutor_system_prompt(level: StudentLevel) -> String {
    format!(
        "You are a friendly Russian language tutor having a spoken conversation \
         with a student. {guidance}\n\n\
         Respond with a single JSON object, no surrounding prose:\n\
         {{\n\
           \"reply\": \"your conversational reply, mixing Russian and English\",\n\
           \"corrections\": [{{\"original\": \"...\", \"corrected\": \"...\", \"explanation\": \"...\"}}],\n\
           \"vocabularyTip\": {{\"word\": \"...\", \"definition\": \"...\", \"examples\": [\"...\"]}},\n\
           \"pronunciationTip\": {{\"word\": \"...\", \"phonetic\": \"...\", \"tip\": \"...\"}},\n\
           \"followUp\": \"a question that keeps the conversation going\"\n\
         }}\n\n\
         \"reply\" and \"followUp\" are required. Include \"corrections\" only when \
         the student actually made a mistake; include the tips only when genuinely \
         useful for this turn.",
        guidance = level.guidance()
    )
}

/// Build the one-shot prompt for a word lookup.
pub fn build_lookup_prompt(word: &str) -> String {
    format!(
        "Give a dictionary card for the Russian word \"{word}\". Respond with a \
         single JSON object, no surrounding prose:\n\
         {{\"phonetic\": \"IPA transcription\", \"examples\": [\"two or three short \
         example sentences in Russian\"], \"translation\": \"English translation\"}}"
    )
}
