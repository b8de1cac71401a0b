//! Split mixed Russian/English text into contiguous language-tagged runs.

use beseda_core::types::{LanguageTag, Run};

/// Segment text into ordered runs of one language each.
///
/// The input is cleaned first: parenthesized asides (pronunciation and
/// transliteration hints) are dropped, whitespace runs collapse to single
/// spaces, and the ends are trimmed. Concatenating the returned runs' text
/// reproduces the cleaned input exactly. Empty or whitespace-only input
/// yields no runs.
///
/// Classification is per whitespace-delimited token: any Cyrillic letter
/// makes the whole token Russian. Mixed-script tokens are not sub-split.
pub fn segment(text: &str) -> Vec<Run> {
    let cleaned = collapse_whitespace(&strip_parentheticals(text));
    if cleaned.is_empty() {
        return Vec::new();
    }

    let mut runs: Vec<Run> = Vec::new();
    for word in cleaned.split(' ') {
        let language = classify(word);
        match runs.last_mut() {
            Some(run) if run.language == language => {
                run.text.push(' ');
                run.text.push_str(word);
            }
            _ => {
                // The separating space binds to the run it introduces, so a
                // language change opens the new run at that space.
                let mut text = String::new();
                if !runs.is_empty() {
                    text.push(' ');
                }
                text.push_str(word);
                runs.push(Run::new(language, text));
            }
        }
    }

    runs
}

/// Classify a single token: Russian if it contains any Cyrillic letter.
fn classify(token: &str) -> LanguageTag {
    if token.chars().any(is_cyrillic_letter) {
        LanguageTag::Russian
    } else {
        LanguageTag::English
    }
}

/// Cyrillic letter check. Ё/ё sit outside the two contiguous а-я/А-Я ranges
/// and are matched explicitly.
fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Drop parenthesized asides, including nested ones.
fn strip_parentheticals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth: usize = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Collapse whitespace runs to single spaces and trim both ends.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}
