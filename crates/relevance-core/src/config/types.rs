//! Sub-configuration structs with their defaults.

use crate::scoring::MissingModalityPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.relevance/models"),
        }
    }
}

/// Sentence embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model directory name under `general.model_dir`
    pub model: String,

    /// Maximum number of tokens fed to the encoder; longer texts are truncated
    pub max_length: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            max_length: 256,
        }
    }
}

/// HTTP fetch settings shared by image and link fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum response body size in megabytes
    pub max_response_mb: u64,

    /// User-Agent header sent with every fetch
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_response_mb: 20,
            user_agent: format!("relevance/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Captioning LLM call timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            llm_timeout_ms: 60000,
        }
    }
}

/// Link extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Maximum characters of visible page text kept for embedding
    pub char_limit: usize,

    /// Prepend the page title and meta description to the embedded text
    pub include_metadata: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            char_limit: 500,
            include_metadata: false,
        }
    }
}

/// Image captioning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Default captioning provider ("ollama", "anthropic", "openai", "hyperbolic").
    /// When unset, images are skipped unless `--llm` is passed.
    pub provider: Option<String>,

    /// Prompt sent alongside each image
    pub prompt: String,

    /// Maximum tokens in a caption
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            provider: None,
            prompt: "Describe this image concisely in one paragraph, written in a single line. \
                     Do not use bullet points or numbering, only plain sentences."
                .to_string(),
            max_tokens: 300,
            temperature: 0.3,
        }
    }
}

/// Relevance combination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the best image similarity
    pub image_weight: f32,

    /// Weight of the best link similarity
    pub link_weight: f32,

    /// How a modality with no usable attachment is treated
    pub missing_modality: MissingModalityPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            image_weight: 0.5,
            link_weight: 0.5,
            missing_modality: MissingModalityPolicy::ZeroFill,
        }
    }
}

/// GitHub API settings (automation mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (override for GitHub Enterprise)
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,

    /// Hyperbolic (self-hosted cloud) configuration
    pub hyperbolic: Option<HyperbolicConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
        }
    }
}

/// Hyperbolic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperbolicConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for HyperbolicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.hyperbolic.xyz/v1".to_string(),
            api_key: "${HYPERBOLIC_API_KEY}".to_string(),
            model: "meta-llama/Llama-3.2-11B-Vision-Instruct".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API endpoint (override for OpenAI-compatible gateways such as OpenRouter)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}
