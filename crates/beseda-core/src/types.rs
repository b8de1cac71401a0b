use serde::{Deserialize, Serialize};

/// Language classification for a run of text.
///
/// Russian is the tutoring target language, English the conversational one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTag {
    Russian,
    English,
}

impl LanguageTag {
    /// BCP-47 locale tag used for voice matching.
    pub fn locale(&self) -> &'static str {
        match self {
            Self::Russian => "ru-RU",
            Self::English => "en-US",
        }
    }

    /// Language code prefix ("ru" / "en").
    pub fn code(&self) -> &'static str {
        match self {
            Self::Russian => "ru",
            Self::English => "en",
        }
    }
}

/// A maximal substring of one language classification.
///
/// Concatenating the `text` of all runs produced from one input reproduces
/// the cleaned input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub language: LanguageTag,
    pub text: String,
}

impl Run {
    pub fn new(language: LanguageTag, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }
}

/// A single grammar/word-choice correction inside a tutor reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

/// Vocabulary tip attached to a tutor reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyTip {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Pronunciation tip attached to a tutor reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationTip {
    pub word: String,
    pub phonetic: String,
    pub tip: String,
}

/// One structured tutor turn, extracted from an LLM completion.
///
/// `reply` and `follow_up` are always present — extraction substitutes
/// defaults when the completion is malformed. Optional fields are present
/// only when the completion supplied them non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections: Option<Vec<Correction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_tip: Option<VocabularyTip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_tip: Option<PronunciationTip>,
    pub follow_up: String,
}

/// Dictionary-style card for a single word.
///
/// Fields default to empty strings/lists rather than being absent, so
/// display code never branches on presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordLookup {
    pub phonetic: String,
    #[serde(default)]
    pub examples: Vec<String>,
    pub translation: String,
}
