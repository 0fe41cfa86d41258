use serde::{Deserialize, Serialize};

/// The interpretive framing requested by the dreamer.
///
/// [`Auto`](InterpretationMethod::Auto) lets the model pick the framing it
/// considers the best fit and say which one it chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpretationMethod {
    Auto,
    Jungian,
    Freudian,
    Gestalt,
    Cognitive,
    Existential,
}

impl InterpretationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            InterpretationMethod::Auto => "auto",
            InterpretationMethod::Jungian => "jungian",
            InterpretationMethod::Freudian => "freudian",
            InterpretationMethod::Gestalt => "gestalt",
            InterpretationMethod::Cognitive => "cognitive",
            InterpretationMethod::Existential => "existential",
        }
    }
}

impl Default for InterpretationMethod {
    fn default() -> Self {
        InterpretationMethod::Auto
    }
}

impl std::fmt::Display for InterpretationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured context the journal form collects alongside the free-text
/// description. Every field is optional; set fields are appended to the
/// prompt in a fixed, labeled order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DreamContext {
    /// Dominant emotion felt during the dream.
    pub emotion: Option<String>,
    /// Current life situation of the dreamer.
    pub life_situation: Option<String>,
    /// Free associations the dreamer has with the dream imagery.
    pub associations: Option<String>,
    /// Whether this is a recurring dream.
    pub recurring: Option<bool>,
    /// Events from the previous day that may have seeded the dream.
    pub day_residue: Option<String>,
    /// Kinds of characters that appeared (strangers, family, ...).
    pub characters: Option<String>,
    /// The dreamer's own role (observer, participant, ...).
    pub dreamer_role: Option<String>,
    /// Physical sensation on waking.
    pub waking_sensation: Option<String>,
}

/// One dream submission: what was dreamt, the structured context around it,
/// and the requested interpretive method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamData {
    pub description: String,
    #[serde(default)]
    pub context: DreamContext,
    #[serde(default)]
    pub method: InterpretationMethod,
}

impl DreamData {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            context: DreamContext::default(),
            method: InterpretationMethod::default(),
        }
    }
}
