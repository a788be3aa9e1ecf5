//! The manager's choice among drafts.
//!
//! The manager is asked for `{"choice": n, "reason": "..."}` but models do
//! not always comply, so the answer is read leniently. A JSON object (bare,
//! fenced, or embedded in prose) is authoritative: its choice is used as is
//! or the reply is unreadable. Only a reply without JSON is scanned for a
//! standalone number such as `4`, `#4` or `[4]`; digits inside words like
//! `gpt-4o` or `sales_agent3` never count.

use serde_json::Value;

use sdr_types::agent::Selection;

const CHOICE_KEYS: [&str; 4] = ["choice", "selected", "index", "draft"];

/// Parse the manager's reply into a zero-based selection among `count` drafts.
///
/// Numbers in the reply are 1-based. Returns `None` when nothing usable is
/// found.
pub fn parse_selection(text: &str, count: usize) -> Option<Selection> {
    if count == 0 {
        return None;
    }
    if let Some(object) = find_json_object(text) {
        let reason = object
            .get("reason")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let raw = CHOICE_KEYS.iter().find_map(|key| object.get(*key))?;
        let n = as_number(raw).filter(|n| (1..=count as u64).contains(n))?;
        return Some(Selection {
            index: (n - 1) as usize,
            reason,
            fallback: false,
        });
    }
    standalone_numbers(text)
        .find(|n| (1..=count).contains(n))
        .map(|n| Selection {
            index: n - 1,
            reason: None,
            fallback: false,
        })
}

/// The selection used when the manager's reply cannot be read.
pub fn fallback_selection() -> Selection {
    Selection {
        index: 0,
        reason: None,
        fallback: true,
    }
}

fn as_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().trim_start_matches('#').parse().ok(),
        _ => None,
    }
}

fn find_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let stripped = strip_fence(text);
    if let Ok(Value::Object(map)) = serde_json::from_str(stripped) {
        return Some(map);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Numbers that stand on their own, in order of appearance.
fn standalone_numbers(text: &str) -> impl Iterator<Item = usize> + '_ {
    let bytes = text.as_bytes();
    let word_char = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                i += 1;
                continue;
            }
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let joined_before = start > 0
                && (word_char(bytes[start - 1]) || matches!(bytes[start - 1], b'-' | b'.'));
            let joined_after = bytes.get(i).is_some_and(|&b| {
                word_char(b) || (b == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
            });
            if joined_before || joined_after {
                continue;
            }
            if let Ok(n) = text[start..i].parse() {
                return Some(n);
            }
        }
        None
    })
}
