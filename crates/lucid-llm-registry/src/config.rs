//! Operator-managed provider and model records.
//!
//! These rows are created and edited through the admin surface; the core
//! only ever reads them through a [`ConfigStore`](crate::ConfigStore).

use serde::{Deserialize, Serialize};

use lucid_llm::{Error, GenerationOptions};

/// The fixed set of supported provider tags.
///
/// `aitunnel` and `neuroapi` are OpenAI-compatible resellers: they share the
/// OpenAI adapter and differ only in base URL, as does `custom` with an
/// operator-supplied URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "aitunnel")]
    AiTunnel,
    #[serde(rename = "neuroapi")]
    NeuroApi,
    Claude,
    Custom,
}

impl ProviderType {
    pub const ALL: [ProviderType; 6] = [
        ProviderType::Gemini,
        ProviderType::OpenAi,
        ProviderType::AiTunnel,
        ProviderType::NeuroApi,
        ProviderType::Claude,
        ProviderType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::Gemini => "gemini",
            ProviderType::OpenAi => "openai",
            ProviderType::AiTunnel => "aitunnel",
            ProviderType::NeuroApi => "neuroapi",
            ProviderType::Claude => "claude",
            ProviderType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.to_lowercase();
        ProviderType::ALL
            .into_iter()
            .find(|p| p.as_str() == tag)
            .ok_or_else(|| {
                let supported: Vec<&str> =
                    ProviderType::ALL.iter().map(|p| p.as_str()).collect();
                Error::config(format!(
                    "unsupported provider type '{s}' (supported: {})",
                    supported.join(", ")
                ))
            })
    }
}

/// What the provider is being asked to do. Configured and cached
/// independently per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Text,
    Image,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Text => "text",
            TaskKind::Image => "image",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator-defined connection profile for an upstream vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub provider_type: ProviderType,
    /// Display name shown to users and used in error messages.
    pub name: String,
    /// Override for OpenAI-compatible variants on other hosts.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key. The key itself
    /// is never stored here.
    pub api_key_env: String,
    /// Default generation parameters; individual models may override.
    #[serde(default)]
    pub options: GenerationOptions,
    /// At most one profile is active per task kind; enforced upstream.
    #[serde(default)]
    pub is_active_for_text: bool,
    #[serde(default)]
    pub is_active_for_images: bool,
    #[serde(default)]
    pub default_text_model_id: Option<String>,
    #[serde(default)]
    pub default_image_model_id: Option<String>,
}

impl ProviderConfig {
    pub fn is_active_for(&self, task: TaskKind) -> bool {
        match task {
            TaskKind::Text => self.is_active_for_text,
            TaskKind::Image => self.is_active_for_images,
        }
    }

    pub fn default_model_id(&self, task: TaskKind) -> Option<&str> {
        match task {
            TaskKind::Text => self.default_text_model_id.as_deref(),
            TaskKind::Image => self.default_image_model_id.as_deref(),
        }
    }
}

/// Pricing metadata for display and cost accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCost {
    /// Cost per million input tokens.
    #[serde(default)]
    pub input: f64,
    /// Cost per million output tokens.
    #[serde(default)]
    pub output: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Performance tier labels shown in the model picker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelTier {
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub intelligence: Option<String>,
}

/// One selectable model exposed by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: String,
    /// Human-friendly display name.
    pub name: String,
    /// Wire identifier passed to the upstream API.
    pub model_id: String,
    /// Must match the owning profile's provider_type; validated by the
    /// factory before use.
    pub provider_type: ProviderType,
    #[serde(default)]
    pub supports_images: bool,
    #[serde(default)]
    pub supports_reasoning: bool,
    /// Maximum context window in tokens (0 = unknown).
    #[serde(default)]
    pub context_window: u64,
    #[serde(default)]
    pub cost: ModelCost,
    #[serde(default)]
    pub tier: ModelTier,
    /// Per-model overrides layered over the profile defaults.
    #[serde(default)]
    pub options: GenerationOptions,
}
