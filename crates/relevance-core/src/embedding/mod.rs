//! Text embedding.
//!
//! Every text in a run (the comment, each image caption, each page body) goes
//! through one [`TextEmbedder`] so all vectors share a dimension and space.
//!
//! # Usage
//!
//! ```rust,ignore
//! use relevance_core::embedding::{SentenceEmbedder, TextEmbedder};
//! use relevance_core::Config;
//!
//! let config = Config::default();
//! let embedder = SentenceEmbedder::load(&config.embedding_model_dir(), config.embedding.max_length)?;
//! let embedding = embedder.embed("This comment addresses layout issues in the UI.")?;
//! // embedding is an L2-normalized Vec<f32> with 384 elements
//! ```

pub mod minilm;

use crate::error::PipelineError;

pub use self::minilm::SentenceEmbedder;

/// Maps text to a fixed-dimension vector.
///
/// Implementations are synchronous and CPU-bound; async callers run them on a
/// blocking thread.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}
