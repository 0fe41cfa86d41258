//! Pure mapping from a provider profile to a concrete adapter.

use std::sync::Arc;

use lucid_llm::{DreamAnalyzer, Error, Result, SecretResolver};
use lucid_llm_claude::{CLAUDE_BASE_URL, ClaudeAnalyzer, ClaudeConfig};
use lucid_llm_gemini::{GEMINI_BASE_URL, GeminiAnalyzer, GeminiConfig};
use lucid_llm_openai::{OPENAI_BASE_URL, OpenAiAnalyzer, OpenAiConfig};

use crate::config::{AiModel, ProviderConfig, ProviderType};

pub const AITUNNEL_BASE_URL: &str = "https://api.aitunnel.ru/v1";
pub const NEUROAPI_BASE_URL: &str = "https://neuroapi.host/v1";

/// The provider tags the factory can instantiate, for validation elsewhere
/// (admin dropdowns and the like).
pub fn supported_types() -> &'static [ProviderType] {
    &ProviderType::ALL
}

/// Instantiate the adapter for a profile and its selected model.
///
/// Validates the cross-entity invariant (the model must belong to the
/// profile's provider type) and layers per-model generation overrides over
/// the profile defaults. The API key is resolved here, once, through the
/// injected [`SecretResolver`].
pub fn create_analyzer(
    config: &ProviderConfig,
    model: &AiModel,
    secrets: &dyn SecretResolver,
) -> Result<Arc<dyn DreamAnalyzer>> {
    if model.provider_type != config.provider_type {
        return Err(Error::config(format!(
            "model '{}' belongs to provider type '{}', but profile '{}' has type '{}'",
            model.id, model.provider_type, config.name, config.provider_type
        )));
    }

    let options = config.options.merged_with(model.options);
    let key = secrets.resolve(&config.api_key_env);
    let require_key = || {
        key.clone()
            .ok_or_else(|| Error::auth(&config.name, &config.api_key_env))
    };

    match config.provider_type {
        ProviderType::Gemini => {
            let analyzer = GeminiAnalyzer::new(GeminiConfig {
                provider_name: config.name.clone(),
                // Deferred key validation: Gemini adapters may exist without
                // a key and fail at call time instead.
                api_key: key.clone(),
                key_env: config.api_key_env.clone(),
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
                model: model.model_id.clone(),
                options,
            })?;
            Ok(Arc::new(analyzer))
        }
        ProviderType::OpenAi
        | ProviderType::AiTunnel
        | ProviderType::NeuroApi
        | ProviderType::Custom => {
            let base_url = match (&config.base_url, config.provider_type) {
                (Some(url), _) => url.clone(),
                (None, ProviderType::OpenAi) => OPENAI_BASE_URL.to_string(),
                (None, ProviderType::AiTunnel) => AITUNNEL_BASE_URL.to_string(),
                (None, ProviderType::NeuroApi) => NEUROAPI_BASE_URL.to_string(),
                (None, _) => {
                    return Err(Error::config(format!(
                        "custom provider '{}' requires a base_url",
                        config.name
                    )));
                }
            };
            let analyzer = OpenAiAnalyzer::new(OpenAiConfig {
                provider_name: config.name.clone(),
                api_key: require_key()?,
                key_env: config.api_key_env.clone(),
                base_url,
                model: model.model_id.clone(),
                model_supports_images: model.supports_images,
                // Only the first-party endpoint has the images API.
                native_images: config.provider_type == ProviderType::OpenAi,
                options,
            })?;
            Ok(Arc::new(analyzer))
        }
        ProviderType::Claude => {
            let analyzer = ClaudeAnalyzer::new(ClaudeConfig {
                provider_name: config.name.clone(),
                api_key: require_key()?,
                key_env: config.api_key_env.clone(),
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| CLAUDE_BASE_URL.to_string()),
                model: model.model_id.clone(),
                options,
            })?;
            Ok(Arc::new(analyzer))
        }
    }
}
