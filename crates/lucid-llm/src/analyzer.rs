use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResponse;
use crate::dream::DreamData;
use crate::error::Result;

/// Generation parameters passed to the upstream API.
///
/// Operator-configured defaults on the provider profile, optionally
/// overridden per model. `None` means "let the vendor default apply".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl GenerationOptions {
    /// Layer `other` on top of `self`: any field set in `other` wins.
    pub fn merged_with(self, other: GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: other.temperature.or(self.temperature),
            max_tokens: other.max_tokens.or(self.max_tokens),
            top_p: other.top_p.or(self.top_p),
        }
    }
}

/// Trait that vendor adapter crates implement.
///
/// An adapter owns one upstream wire protocol and translates it into the
/// canonical analyze/generate-image contract. Upstream failures must be
/// re-raised as the matching [`Error`](crate::Error) kind with a message
/// naming the provider.
#[async_trait]
pub trait DreamAnalyzer: std::fmt::Debug + Send + Sync {
    /// Human-facing provider name used in error messages (e.g. `"Gemini"`).
    fn provider_name(&self) -> &str;

    /// Analyze a dream and return the canonical response shape.
    async fn analyze_dream(&self, dream: &DreamData) -> Result<AnalysisResponse>;

    /// Generate an illustrative image and return it as a base64 data URL.
    ///
    /// Adapters without image support must fail with
    /// [`Error::Unsupported`](crate::Error::Unsupported), never a generic
    /// failure.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}
