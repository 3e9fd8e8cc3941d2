//! Relevance Core - scores how well a comment matches its attachments.
//!
//! A comment's text is embedded once. Each attached image is captioned by a
//! vision LLM and each linked page is reduced to its visible text; those texts
//! are embedded with the same encoder and compared to the comment by cosine
//! similarity. The best match per modality is combined into one score.
//!
//! # Architecture
//!
//! ```text
//! Comment ─┬─ text ─────────────────────────────── embed ─┐
//!          ├─ images → fetch → decode → caption ─ embed ─┤→ cosine → max → 0.5·img + 0.5·link
//!          └─ links  → fetch → HTML text ───────── embed ─┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use relevance_core::{Comment, Config, RelevancePipeline, SentenceEmbedder};
//!
//! #[tokio::main]
//! async fn main() -> relevance_core::Result<()> {
//!     let config = Config::load()?;
//!     let embedder = SentenceEmbedder::load(&config.embedding_model_dir(), config.embedding.max_length)?;
//!     let pipeline = RelevancePipeline::from_config(&config, Arc::new(embedder), None)?;
//!
//!     let comment = Comment::new("This comment addresses layout issues in the UI.")
//!         .with_links(["https://example.com/layout"]);
//!     let report = pipeline.score(&comment).await?;
//!     println!("{}", report.score);
//!     Ok(())
//! }
//! ```

pub mod caption;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fetch;
pub mod github;
pub mod link;
pub mod llm;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod types;

// Re-exports for convenient access
pub use caption::{ImageCaptioner, ImageDescriber, ImageDescription};
pub use config::Config;
pub use embedding::{SentenceEmbedder, TextEmbedder};
pub use error::{
    ConfigError, GitHubError, PipelineError, PipelineResult, RelevanceError, Result,
};
pub use fetch::HttpFetcher;
pub use github::{annotate_comment, AnnotationOutcome, AutomationConfig, GitHubClient};
pub use link::{HtmlLinkExtractor, LinkContent, LinkExtraction, LinkExtractor};
pub use output::{ReportFormat, ReportWriter};
pub use pipeline::RelevancePipeline;
pub use scoring::{MissingModalityPolicy, RelevanceCombinator};
pub use types::{Comment, Modality, ModalityOutcome, ModalityResult, RelevanceReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
