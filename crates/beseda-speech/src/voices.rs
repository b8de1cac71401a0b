//! Voice selection policy.

use beseda_core::types::LanguageTag;

use crate::backend::VoiceInfo;

/// Pick a voice for a run's language.
///
/// Preference order: an explicitly configured voice id when the backend
/// advertises it, then a locale match (for English, a higher-quality match
/// first), then `None` — the backend default.
pub fn select_voice<'a>(
    voices: &'a [VoiceInfo],
    language: LanguageTag,
    preferred_id: Option<&str>,
) -> Option<&'a VoiceInfo> {
    if let Some(id) = preferred_id {
        if let Some(voice) = voices.iter().find(|v| v.id == id) {
            return Some(voice);
        }
    }

    let mut matches = voices
        .iter()
        .filter(|v| v.locale.starts_with(language.code()));

    if language == LanguageTag::English {
        let mut matches: Vec<&VoiceInfo> = matches.collect();
        if let Some(idx) = matches.iter().position(|v| v.high_quality) {
            return Some(matches.remove(idx));
        }
        return matches.into_iter().next();
    }

    matches.next()
}
