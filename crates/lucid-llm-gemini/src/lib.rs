//! Google Gemini dream-analysis adapter.
//!
//! The analysis runs as a two-stage pipeline. Stage 1 asks for the summary,
//! analysis, advice, questions and only the *names* of the symbols, which
//! keeps the reply small enough to survive output-token limits. Stage 2 then
//! fans out one request per symbol name, all in flight concurrently; a
//! failed symbol request degrades to a placeholder meaning for that symbol
//! only and never fails the analysis or its siblings.
//!
//! Unlike the other adapters, key validation is deferred: the analyzer can
//! be constructed without a key (so configuration screens can introspect
//! it), but every public method checks the key before any network call.

mod types;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Value, json};

use lucid_llm::{
    AnalysisResponse, DreamAnalyzer, DreamData, Error, GenerationOptions, Result, Symbol,
    normalize, prompt, repair,
};

use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
/// Substituted when one stage-2 symbol request fails.
const PLACEHOLDER_MEANING: &str =
    "A detailed interpretation for this symbol could not be loaded.";
/// Long-form minimum requested from stage-2 symbol interpretations.
const SYMBOL_MEANING_MIN_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Display name used in error messages.
    pub provider_name: String,
    /// `None` defers the failure to the first call.
    pub api_key: Option<String>,
    /// Environment variable the key was resolved from, named in auth errors.
    pub key_env: String,
    pub base_url: String,
    pub model: String,
    pub options: GenerationOptions,
}

pub struct GeminiAnalyzer {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("provider", &self.config.provider_name)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl GeminiAnalyzer {
    /// Construction accepts a missing key; see the module docs.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(Box::new(e)))?;
        Ok(Self { config, client })
    }

    fn require_key(&self) -> Result<&str> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::auth(
                &self.config.provider_name,
                &self.config.key_env,
            )),
        }
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

    /// One generateContent round trip; returns the joined text parts of the
    /// first candidate.
    async fn generate(&self, body: &GenerateContentRequest) -> Result<String> {
        let key = self.require_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        Ok(text)
    }

    async fn stage_one(&self, dream: &DreamData) -> Result<Value> {
        let mut text = prompt::dream_brief(dream);
        text.push_str(
            "\n\nReply with exactly one JSON object and nothing else, in this shape:\n\
             {\n\
             \x20 \"summary\": \"short summary of the interpretation\",\n\
             \x20 \"analysis\": \"long-form analysis, markdown allowed\",\n\
             \x20 \"advice\": [\"practical advice\"],\n\
             \x20 \"questions\": [\"reflective question for the dreamer\"],\n\
             \x20 \"symbol_names\": [\"symbol\"]\n\
             }\n\
             In symbol_names, list only the names of the dream's key symbols; \
             do not include their meanings.",
        );

        let body = GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: Some(Content::system(prompt::SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: self.config.options.temperature,
                max_output_tokens: self.config.options.max_tokens,
                top_p: self.config.options.top_p,
                response_mime_type: Some("application/json"),
                response_schema: Some(stage_one_schema()),
                response_modalities: None,
            }),
        };

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            "sending stage-1 dream analysis request"
        );
        let reply = self.generate(&body).await?;
        // Structured output still truncates at high token counts; after
        // failed repair, hand the normalizer an empty object so the caller
        // gets a shape error rather than a raw parse failure.
        let value = repair::parse_with_repair(&reply).unwrap_or_else(|_| json!({}));
        if value.is_object() {
            Ok(value)
        } else {
            Ok(json!({}))
        }
    }

    async fn symbol_meaning(&self, name: &str, dream: &DreamData) -> Result<String> {
        let text = format!(
            "In the context of this dream: \"{}\"\n\n\
             Give a detailed psychological interpretation of the dream symbol \
             \"{name}\". The meaning must be at least {SYMBOL_MEANING_MIN_CHARS} \
             characters of flowing prose.\n\
             Reply with exactly one JSON object and nothing else:\n\
             {{\"name\": \"{name}\", \"meaning\": \"detailed interpretation\"}}",
            dream.description
        );
        let body = GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: Some(Content::system(prompt::SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: self.config.options.temperature,
                max_output_tokens: self.config.options.max_tokens,
                top_p: self.config.options.top_p,
                response_mime_type: Some("application/json"),
                response_schema: Some(symbol_schema()),
                response_modalities: None,
            }),
        };

        let reply = self.generate(&body).await?;
        let value = repair::parse_with_repair(&reply)?;
        value
            .get("meaning")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::InvalidShape(format!("symbol reply for '{name}' has no meaning"))
            })
    }

    /// Stage-2 fan-out: all symbol requests in flight at once, results
    /// collected in input order, failures isolated per symbol.
    async fn stage_two(&self, names: &[String], dream: &DreamData) -> Vec<Symbol> {
        let tasks = names.iter().map(|name| async move {
            match self.symbol_meaning(name, dream).await {
                Ok(meaning) => Symbol {
                    name: name.clone(),
                    meaning,
                },
                Err(error) => {
                    tracing::warn!(
                        provider = %self.config.provider_name,
                        symbol = %name,
                        %error,
                        "symbol interpretation failed, substituting placeholder"
                    );
                    Symbol {
                        name: name.clone(),
                        meaning: PLACEHOLDER_MEANING.to_string(),
                    }
                }
            }
        });
        join_all(tasks).await
    }
}

#[async_trait]
impl DreamAnalyzer for GeminiAnalyzer {
    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    async fn analyze_dream(&self, dream: &DreamData) -> Result<AnalysisResponse> {
        self.require_key()?;

        let mut stage_one = self.stage_one(dream).await?;
        let names: Vec<String> = stage_one
            .get("symbol_names")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let symbols = self.stage_two(&names, dream).await;
        stage_one["symbolism"] = serde_json::to_value(&symbols)?;
        normalize::normalize(&stage_one)
    }

    async fn generate_image(&self, image_prompt: &str) -> Result<String> {
        self.require_key()?;

        let body = GenerateContentRequest {
            contents: vec![Content::user(image_prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
                ..GenerationConfig::default()
            }),
        };

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            "sending image generation request"
        );
        let key = self.require_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        let inline = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| {
                content
                    .parts
                    .into_iter()
                    .find_map(|part| part.inline_data)
            });

        match inline {
            Some(data) => Ok(format!("data:{};base64,{}", data.mime_type, data.data)),
            None => Err(Error::analysis(format!(
                "{}: image response contained no inline image data",
                self.config.provider_name
            ))),
        }
    }
}

fn stage_one_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "analysis": {"type": "STRING"},
            "advice": {"type": "ARRAY", "items": {"type": "STRING"}},
            "questions": {"type": "ARRAY", "items": {"type": "STRING"}},
            "symbol_names": {"type": "ARRAY", "items": {"type": "STRING"}},
        },
        "required": ["summary", "analysis", "symbol_names"],
    })
}

fn symbol_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": {"type": "STRING"},
            "meaning": {"type": "STRING"},
        },
        "required": ["name", "meaning"],
    })
}
