//! Vision LLM backends used to caption attached images.
//!
//! Provides a provider abstraction over multiple LLM backends (Ollama, Anthropic,
//! OpenAI, Hyperbolic). The captioner in [`crate::caption`] owns one provider
//! for the whole process.

pub(crate) mod anthropic;
pub(crate) mod hyperbolic;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod provider;

pub use provider::{
    ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse, ProviderKind,
};
