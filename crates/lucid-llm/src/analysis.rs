use serde::{Deserialize, Serialize};

/// One dream symbol with its interpreted meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub meaning: String,
}

/// The canonical analysis shape every adapter must produce, regardless of
/// the upstream wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Short summary of the interpretation.
    pub summary: String,
    /// Symbols found in the dream, in the order the model reported them.
    pub symbolism: Vec<Symbol>,
    /// Long-form analysis text (markdown-flavored). Never empty: falls back
    /// to the summary when the model omits it.
    pub analysis: String,
    /// Practical advice derived from the interpretation.
    pub advice: Vec<String>,
    /// Reflective questions for the dreamer.
    pub questions: Vec<String>,
}
