//! LLM provider trait and request/response types.
//!
//! Defines the interface that all captioning backends implement, plus the
//! factory that creates the right provider from CLI flags and config.

use crate::config::{CaptionConfig, LlmConfig};
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to caption an image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The image to describe
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Build a caption request using the configured prompt and sampling settings.
    pub fn caption(image: ImageInput, config: &CaptionConfig) -> Self {
        Self {
            image,
            prompt: config.prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// The response from an LLM caption call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated caption
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "anthropic", "ollama").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate a caption for the given request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Shorthand for a provider failure.
pub(crate) fn llm_error(message: impl Into<String>, status_code: Option<u16>) -> PipelineError {
    PipelineError::Llm {
        message: message.into(),
        status_code,
    }
}

/// POST `body` as JSON and decode the JSON reply.
///
/// Transport, non-2xx and decode failures all become `PipelineError::Llm`
/// prefixed with `label`; the HTTP status is kept when there is one.
pub(crate) async fn send_json<B, R>(
    builder: reqwest::RequestBuilder,
    body: &B,
    label: &str,
) -> Result<R, PipelineError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let resp = builder
        .json(body)
        .send()
        .await
        .map_err(|e| llm_error(format!("{label} request failed: {e}"), None))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(llm_error(
            format!("{label} HTTP {status}: {text}"),
            Some(status.as_u16()),
        ));
    }

    resp.json()
        .await
        .map_err(|e| llm_error(format!("Failed to parse {label} response: {e}"), None))
}

/// Captioning backends the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    Anthropic,
    OpenAi,
    Hyperbolic,
}

impl std::str::FromStr for ProviderKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "hyperbolic" => Ok(Self::Hyperbolic),
            other => Err(llm_error(format!("Unknown LLM provider: {other}"), None)),
        }
    }
}

/// Builds the captioning provider named on the command line or in config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider by name.
    ///
    /// `model_override` replaces the model from the provider's config section;
    /// `timeout` bounds every request the provider makes.
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>, PipelineError> {
        let model = |configured: &str| model_override.unwrap_or(configured).to_string();

        let provider: Box<dyn LlmProvider> = match provider.parse()? {
            ProviderKind::Ollama => {
                let cfg = config.ollama.clone().unwrap_or_default();
                Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &model(&cfg.model),
                    timeout,
                ))
            }
            ProviderKind::Anthropic => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = require_api_key(&cfg.api_key, "Anthropic", "ANTHROPIC_API_KEY")?;
                Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key,
                    &model(&cfg.model),
                    timeout,
                ))
            }
            ProviderKind::OpenAi => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = require_api_key(&cfg.api_key, "OpenAI", "OPENAI_API_KEY")?;
                Box::new(super::openai::OpenAiProvider::with_base_url(
                    &cfg.endpoint,
                    &api_key,
                    &model(&cfg.model),
                    timeout,
                ))
            }
            ProviderKind::Hyperbolic => {
                let cfg = config.hyperbolic.clone().unwrap_or_default();
                let api_key =
                    require_api_key(&cfg.api_key, "Hyperbolic", "HYPERBOLIC_API_KEY")?;
                Box::new(super::hyperbolic::HyperbolicProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model(&cfg.model),
                    timeout,
                ))
            }
        };
        Ok(provider)
    }
}

fn require_api_key(value: &str, label: &str, env_var: &str) -> Result<String, PipelineError> {
    resolve_env_var(value)
        .ok_or_else(|| llm_error(format!("{label} API key not set. Set {env_var} env var."), None))
}
