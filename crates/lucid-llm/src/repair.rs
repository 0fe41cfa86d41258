//! Best-effort repair of truncated JSON replies.
//!
//! Upstream APIs routinely cut structured output off at the max-token limit,
//! which loses a trailing quote or brace from an otherwise-valid
//! multi-kilobyte reply. This is approximate recovery, not a guarantee: the
//! passes run in order of increasing aggressiveness and the caller gets
//! [`Error::MalformedResponse`] only after all of them fail.

use serde_json::Value;

use crate::error::{Error, Result};

/// Parse `raw` as JSON, attempting repair passes on failure.
///
/// Order: as-is, code fences stripped, structural repair (close an
/// unterminated string, then unclosed brackets), first-`{...}` extraction.
pub fn parse_with_repair(raw: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    let stripped = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str(stripped) {
        return Ok(value);
    }

    let repaired = structural_repair(stripped);
    if let Ok(value) = serde_json::from_str(&repaired) {
        return Ok(value);
    }

    if let Some(object) = extract_object(stripped) {
        if let Ok(value) = serde_json::from_str(object) {
            return Ok(value);
        }
    }

    Err(Error::malformed(format!(
        "unparseable JSON after repair: {}",
        truncate_for_message(raw)
    )))
}

/// Remove a markdown code-fence wrapper (```json ... ``` or ``` ... ```).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the fence line, including a language tag like "json".
        s = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches("json"),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Close an unterminated string, then any unclosed brackets (innermost
/// first), so `{"a":[1,2` becomes `{"a":[1,2]}`.
pub fn structural_repair(raw: &str) -> String {
    let mut s = raw.trim_end().to_string();

    // An odd number of unescaped quotes means the reply was cut off
    // mid-string. A trailing lone backslash would escape the quote we are
    // about to append, so drop it first.
    if count_unescaped_quotes(&s) % 2 == 1 {
        if ends_with_unescaped_backslash(&s) {
            s.pop();
        }
        s.push('"');
    }

    for closer in unclosed_brackets(&s).into_iter().rev() {
        s.push(closer);
    }
    s
}

/// The first `{...}` substring, spanning to the last closing brace.
pub fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start { Some(&raw[start..=end]) } else { None }
}

fn count_unescaped_quotes(s: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            count += 1;
        }
    }
    count
}

fn ends_with_unescaped_backslash(s: &str) -> bool {
    let trailing = s.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Closers still owed for `{` / `[` opened outside of strings, in opening
/// order.
fn unclosed_brackets(s: &str) -> Vec<char> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack
}

fn truncate_for_message(raw: &str) -> String {
    const LIMIT: usize = 120;
    if raw.len() <= LIMIT {
        raw.to_string()
    } else {
        let cut = raw
            .char_indices()
            .take_while(|(i, _)| *i < LIMIT)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &raw[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_json_passes_through() {
        let value = parse_with_repair(r#"{"summary":"ok"}"#).unwrap();
        assert_eq!(value, json!({"summary": "ok"}));
    }

    #[test]
    fn code_fences_are_stripped() {
        let raw = "```json\n{\"summary\":\"ok\"}\n```";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value, json!({"summary": "ok"}));
    }

    #[test]
    fn unterminated_string_is_closed() {
        let value = parse_with_repair(r#"{"summary":"ok","analysis":"text"#).unwrap();
        assert_eq!(value, json!({"summary": "ok", "analysis": "text"}));
    }

    #[test]
    fn unmatched_brackets_close_in_nesting_order() {
        let value = parse_with_repair(r#"{"a":[1,2"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn trailing_backslash_is_dropped_before_closing_quote() {
        let value = parse_with_repair("{\"a\":\"x\\").unwrap();
        assert_eq!(value, json!({"a": "x"}));
    }

    #[test]
    fn object_is_extracted_from_surrounding_prose() {
        let raw = "Here is your analysis: {\"summary\":\"ok\"} hope it helps";
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value, json!({"summary": "ok"}));
    }

    #[test]
    fn hopeless_input_is_malformed() {
        assert!(matches!(
            parse_with_repair("no braces here"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let value = parse_with_repair(r#"{"a":"[{","b":[1"#).unwrap();
        assert_eq!(value, json!({"a": "[{", "b": [1]}));
    }
}
