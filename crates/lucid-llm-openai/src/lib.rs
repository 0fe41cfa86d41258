//! OpenAI-compatible dream-analysis adapter.
//!
//! One implementation serves every provider that exposes an OpenAI-shaped
//! chat-completions endpoint (first-party OpenAI plus AITunnel, NeuroAPI and
//! custom hosts); they differ only in base URL and display name. Image
//! generation is only available on the first-party endpoint, which the
//! composition root signals via [`OpenAiConfig::native_images`].

mod types;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use lucid_llm::{
    AnalysisResponse, DreamAnalyzer, DreamData, Error, GenerationOptions, Result, normalize,
    prompt, repair,
};

use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageGenerationRequest,
    ImageGenerationResponse, ResponseFormat,
};

/// First-party endpoint. Other base URLs share the adapter but not the
/// image-generation path.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Configuration resolved by the factory from the provider profile and the
/// selected model.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Display name used in error messages ("OpenAI", "AITunnel", ...).
    pub provider_name: String,
    pub api_key: String,
    /// Environment variable the key was resolved from, named in auth errors.
    pub key_env: String,
    pub base_url: String,
    /// Wire model identifier.
    pub model: String,
    /// Capability flag of the selected model.
    pub model_supports_images: bool,
    /// True only for the first-party OpenAI endpoint.
    pub native_images: bool,
    pub options: GenerationOptions,
}

pub struct OpenAiAnalyzer {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl fmt::Debug for OpenAiAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAnalyzer")
            .field("provider", &self.config.provider_name)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiAnalyzer {
    /// Fails immediately when the resolved API key is empty; no request may
    /// ever be attempted with a known-empty key.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::auth(&config.provider_name, &config.key_env));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(Box::new(e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                provider: self.config.provider_name.clone(),
            }
        } else {
            Error::Http(Box::new(e))
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let provider = self.config.provider_name.clone();
        match status.as_u16() {
            401 | 403 => Err(Error::auth(provider, &self.config.key_env)),
            429 => Err(Error::RateLimit { provider }),
            s if s >= 500 => Err(Error::Unavailable { provider }),
            _ => {
                let detail = response.text().await.unwrap_or_default();
                Err(Error::analysis(format!(
                    "{provider}: request failed with status {status}: {detail}"
                )))
            }
        }
    }

    async fn download_as_data_url(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(&bytes)))
    }
}

#[async_trait]
impl DreamAnalyzer for OpenAiAnalyzer {
    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    async fn analyze_dream(&self, dream: &DreamData) -> Result<AnalysisResponse> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::build_analysis_prompt(dream),
                },
            ],
            temperature: self.config.options.temperature,
            max_tokens: self.config.options.max_tokens,
            top_p: self.config.options.top_p,
            response_format: Some(ResponseFormat::json_object()),
        };

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            "sending dream analysis request"
        );
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                Error::analysis(format!(
                    "{}: completion contained no message content",
                    self.config.provider_name
                ))
            })?;

        let value = repair::parse_with_repair(&content)?;
        normalize::normalize(&value)
    }

    async fn generate_image(&self, image_prompt: &str) -> Result<String> {
        if !self.config.native_images {
            return Err(Error::unsupported(
                &self.config.provider_name,
                "image generation",
            ));
        }
        if !self.config.model_supports_images {
            return Err(Error::unsupported(
                format!(
                    "{} model '{}'",
                    self.config.provider_name, self.config.model
                ),
                "image generation",
            ));
        }

        let body = ImageGenerationRequest {
            model: self.config.model.clone(),
            prompt: image_prompt.to_string(),
            n: 1,
            size: "1024x1024",
        };

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            "sending image generation request"
        );
        let response = self
            .client
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        let image = generated.data.into_iter().next().ok_or_else(|| {
            Error::analysis(format!(
                "{}: image response contained no image",
                self.config.provider_name
            ))
        })?;

        if let Some(b64) = image.b64_json {
            return Ok(format!("data:image/png;base64,{b64}"));
        }
        let url = image.url.ok_or_else(|| {
            Error::analysis(format!(
                "{}: image response contained neither URL nor inline data",
                self.config.provider_name
            ))
        })?;
        self.download_as_data_url(&url).await
    }
}
