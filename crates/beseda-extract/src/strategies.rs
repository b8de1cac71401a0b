//! Ordered payload-recovery strategies with explicit fallthrough.

use serde_json::Value;

/// Try each strategy in order; the caller supplies the terminal fallback.
pub(crate) fn extract_payload(raw: &str) -> Option<Value> {
    brace_slice(raw).or_else(|| fenced_block(raw))
}

/// Strategy 1: greedy outer-brace slice — first `{` through last `}`.
fn brace_slice(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&raw[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// Strategy 2: a fenced code block labeled `json` (or unlabeled).
fn fenced_block(raw: &str) -> Option<Value> {
    let mut in_fence = false;
    let mut json_fence = false;
    let mut buffer = String::new();

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("```") {
            if !in_fence {
                let lang = rest.trim().to_ascii_lowercase();
                json_fence = lang.is_empty() || lang == "json";
                in_fence = true;
                buffer.clear();
            } else {
                if json_fence {
                    if let Ok(value) = serde_json::from_str::<Value>(buffer.trim()) {
                        if value.is_object() {
                            return Some(value);
                        }
                    }
                }
                in_fence = false;
                json_fence = false;
                buffer.clear();
            }
            continue;
        }

        if in_fence && json_fence {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    None
}
