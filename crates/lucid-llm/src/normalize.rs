//! Turns an arbitrary upstream reply into a valid [`AnalysisResponse`], or
//! fails loudly.
//!
//! Every adapter runs its (possibly repaired) reply through this single
//! validator instead of carrying its own shape checks.

use serde_json::Value;

use crate::analysis::{AnalysisResponse, Symbol};
use crate::error::{Error, Result};

/// Parse a raw string reply as JSON and normalize it.
///
/// A parse failure is [`Error::MalformedResponse`]; callers that expect
/// truncated output should run [`crate::repair::parse_with_repair`] first.
pub fn normalize_str(raw: &str) -> Result<AnalysisResponse> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::malformed(e.to_string()))?;
    normalize(&value)
}

/// Validate and coerce a parsed reply into the canonical shape.
///
/// Rules:
/// - `summary` must be a non-empty string; anything else rejects the whole
///   response with [`Error::InvalidShape`].
/// - `symbolism` absent or not a list coerces to an empty list, but any
///   entry missing `name` or `meaning` rejects the whole response.
/// - `analysis` missing or empty falls back to the summary text.
/// - `advice` and `questions` coerce to string lists, silently dropping
///   non-string entries.
pub fn normalize(value: &Value) -> Result<AnalysisResponse> {
    let summary = match value.get("summary").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => {
            return Err(Error::InvalidShape(
                "missing or empty 'summary' field".into(),
            ));
        }
    };

    let symbolism = match value.get("symbolism") {
        Some(Value::Array(entries)) => {
            let mut symbols = Vec::with_capacity(entries.len());
            for (i, entry) in entries.iter().enumerate() {
                let name = entry.get("name").and_then(Value::as_str);
                let meaning = entry.get("meaning").and_then(Value::as_str);
                match (name, meaning) {
                    (Some(name), Some(meaning)) if !name.is_empty() && !meaning.is_empty() => {
                        symbols.push(Symbol {
                            name: name.to_string(),
                            meaning: meaning.to_string(),
                        });
                    }
                    _ => {
                        return Err(Error::InvalidShape(format!(
                            "symbolism entry {i} is missing 'name' or 'meaning'"
                        )));
                    }
                }
            }
            symbols
        }
        _ => Vec::new(),
    };

    let analysis = match value.get("analysis").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => summary.clone(),
    };

    Ok(AnalysisResponse {
        summary,
        symbolism,
        analysis,
        advice: string_list(value.get("advice")),
        questions: string_list(value.get("questions")),
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
