//! Anthropic Claude dream-analysis adapter.
//!
//! Single-stage: one Messages API call with a system instruction plus the
//! built prompt. Claude has no image-generation endpoint, so
//! `generate_image` always fails with an explicit unsupported error.

mod types;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use lucid_llm::{
    AnalysisResponse, DreamAnalyzer, DreamData, Error, GenerationOptions, Result, normalize,
    prompt, repair,
};

use crate::types::{ContentBlock, MessagesRequest, MessagesResponse, RequestMessage};

pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
/// The Messages API requires max_tokens; applied when the model and the
/// provider profile leave it unset.
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// Display name used in error messages.
    pub provider_name: String,
    pub api_key: String,
    /// Environment variable the key was resolved from, named in auth errors.
    pub key_env: String,
    pub base_url: String,
    pub model: String,
    pub options: GenerationOptions,
}

pub struct ClaudeAnalyzer {
    config: ClaudeConfig,
    client: reqwest::Client,
}

impl fmt::Debug for ClaudeAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeAnalyzer")
            .field("provider", &self.config.provider_name)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ClaudeAnalyzer {
    /// Fails immediately when the resolved API key is empty.
    pub fn new(config: ClaudeConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::auth(&config.provider_name, &config.key_env));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(Box::new(e)))?;
        Ok(Self { config, client })
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
}

#[async_trait]
impl DreamAnalyzer for ClaudeAnalyzer {
    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    async fn analyze_dream(&self, dream: &DreamData) -> Result<AnalysisResponse> {
        let body = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: prompt::SYSTEM_INSTRUCTION.to_string(),
            messages: vec![RequestMessage {
                role: "user",
                content: prompt::build_analysis_prompt(dream),
            }],
            temperature: self.config.options.temperature,
            top_p: self.config.options.top_p,
        };

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            "sending dream analysis request"
        );
        let url = format!(
            "{}/v1/messages",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let message: MessagesResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        let text: String = message
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        if text.is_empty() {
            return Err(Error::analysis(format!(
                "{}: reply contained no text content",
                self.config.provider_name
            )));
        }

        let value = repair::parse_with_repair(&text)?;
        normalize::normalize(&value)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String> {
        Err(Error::unsupported(
            &self.config.provider_name,
            "image generation",
        ))
    }
}
