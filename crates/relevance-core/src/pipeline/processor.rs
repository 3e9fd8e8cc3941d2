//! Pipeline orchestration: one comment in, one relevance report out.

use std::sync::Arc;
use std::time::Instant;

use crate::caption::{ImageCaptioner, ImageDescriber, ImageDescription};
use crate::config::Config;
use crate::embedding::TextEmbedder;
use crate::error::PipelineError;
use crate::fetch::HttpFetcher;
use crate::link::{HtmlLinkExtractor, LinkExtraction, LinkExtractor};
use crate::llm::LlmProvider;
use crate::math::cosine_similarity;
use crate::scoring::RelevanceCombinator;
use crate::types::{Comment, Modality, ModalityOutcome, ModalityResult, RelevanceReport};

/// Scores comments against their image and link attachments.
///
/// Items are processed one at a time in input order. A broken attachment is
/// recorded as missing and never aborts the others; embedder and captioning
/// model failures abort the comment.
pub struct RelevancePipeline {
    embedder: Arc<dyn TextEmbedder>,
    describer: Option<Box<dyn ImageDescriber>>,
    extractor: Box<dyn LinkExtractor>,
    combinator: RelevanceCombinator,
    include_link_metadata: bool,
}

impl RelevancePipeline {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        extractor: Box<dyn LinkExtractor>,
        combinator: RelevanceCombinator,
    ) -> Self {
        Self {
            embedder,
            describer: None,
            extractor,
            combinator,
            include_link_metadata: false,
        }
    }

    /// Enable image captioning.
    pub fn with_describer(mut self, describer: Box<dyn ImageDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Prepend page title and description to the embedded link text.
    pub fn with_link_metadata(mut self, include: bool) -> Self {
        self.include_link_metadata = include;
        self
    }

    /// Wire the HTTP-backed captioner and link extractor from configuration.
    ///
    /// Without a `provider`, images are reported as missing.
    pub fn from_config(
        config: &Config,
        embedder: Arc<dyn TextEmbedder>,
        provider: Option<Box<dyn LlmProvider>>,
    ) -> Result<Self, PipelineError> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let extractor = HtmlLinkExtractor::new(fetcher.clone(), &config.link);

        let mut pipeline = Self::new(
            embedder,
            Box::new(extractor),
            RelevanceCombinator::new(&config.scoring),
        )
        .with_link_metadata(config.link.include_metadata);

        if let Some(provider) = provider {
            tracing::debug!("Image captioning via {}", provider.name());
            pipeline = pipeline.with_describer(Box::new(ImageCaptioner::new(
                fetcher,
                config.limits.clone(),
                provider,
                config.caption.clone(),
            )));
        }

        Ok(pipeline)
    }

    pub fn captioning_enabled(&self) -> bool {
        self.describer.is_some()
    }

    /// Score a single comment.
    pub async fn score(&self, comment: &Comment) -> Result<RelevanceReport, PipelineError> {
        let start = Instant::now();

        let text_embedding = self.embed(&comment.text).await?;
        tracing::trace!("  Text embedding: {:?}", start.elapsed());

        let mut items = Vec::with_capacity(comment.image_urls.len() + comment.link_urls.len());
        let mut image_similarities = Vec::new();
        let mut link_similarities = Vec::new();

        for url in &comment.image_urls {
            let outcome = self.score_image(url, &text_embedding).await?;
            if let ModalityOutcome::Scored { similarity, .. } = outcome {
                image_similarities.push(similarity);
            }
            items.push(ModalityResult {
                modality: Modality::Image,
                url: url.clone(),
                outcome,
            });
        }

        for url in &comment.link_urls {
            let outcome = self.score_link(url, &text_embedding).await?;
            if let ModalityOutcome::Scored { similarity, .. } = outcome {
                link_similarities.push(similarity);
            }
            items.push(ModalityResult {
                modality: Modality::Link,
                url: url.clone(),
                outcome,
            });
        }

        let score =
            self.combinator
                .combine(&text_embedding, &image_similarities, &link_similarities);

        tracing::debug!(
            "Scored comment in {:?}: {score} ({}/{} images, {}/{} links)",
            start.elapsed(),
            image_similarities.len(),
            comment.image_urls.len(),
            link_similarities.len(),
            comment.link_urls.len()
        );

        Ok(RelevanceReport {
            score,
            image_similarity: crate::scoring::best_similarity(&image_similarities),
            link_similarity: crate::scoring::best_similarity(&link_similarities),
            missing_modality: self.combinator.policy(),
            items,
        })
    }

    async fn score_image(
        &self,
        url: &str,
        text_embedding: &[f32],
    ) -> Result<ModalityOutcome, PipelineError> {
        let Some(describer) = &self.describer else {
            return Ok(missing("captioning disabled"));
        };

        match describer.describe(url).await? {
            ImageDescription::Described { text, .. } => {
                tracing::info!("Image description: {text}");
                self.compare(text, text_embedding).await
            }
            ImageDescription::Unavailable { reason, .. } => Ok(missing(reason)),
        }
    }

    async fn score_link(
        &self,
        url: &str,
        text_embedding: &[f32],
    ) -> Result<ModalityOutcome, PipelineError> {
        match self.extractor.extract(url).await {
            LinkExtraction::Extracted(content) => {
                let text = content.embedding_text(self.include_link_metadata);
                if text.trim().is_empty() {
                    return Ok(missing("page has no text content"));
                }
                tracing::info!("Extracted link content from {url}");
                self.compare(text, text_embedding).await
            }
            LinkExtraction::Unavailable { reason, .. } => Ok(missing(reason)),
        }
    }

    async fn compare(
        &self,
        content: String,
        text_embedding: &[f32],
    ) -> Result<ModalityOutcome, PipelineError> {
        let embedding = self.embed(&content).await?;
        let similarity = cosine_similarity(text_embedding, &embedding);
        Ok(ModalityOutcome::Scored {
            content,
            similarity,
        })
    }

    /// Run the embedder on a blocking thread.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| PipelineError::Model {
                message: format!("Embedding task failed: {e}"),
            })?
    }
}

fn missing(reason: impl Into<String>) -> ModalityOutcome {
    ModalityOutcome::Missing {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Bag-of-words embedder: one dimension per known word.
    struct WordEmbedder;

    const VOCAB: &[&str] = &["layout", "ui", "sidebar", "cat", "recipe", "issues"];

    impl TextEmbedder for WordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
            let lower = text.to_lowercase();
            Ok(VOCAB
                .iter()
                .map(|w| lower.split(|c: char| !c.is_alphanumeric()).filter(|t| t == w).count() as f32)
                .collect())
        }
    }

    struct FailingEmbedder;

    impl TextEmbedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, PipelineError> {
            Err(PipelineError::Model {
                message: "boom".to_string(),
            })
        }
    }

    /// Canned describer keyed by URL; unknown URLs are unavailable.
    struct MapDescriber(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ImageDescriber for MapDescriber {
        async fn describe(&self, url: &str) -> Result<ImageDescription, PipelineError> {
            Ok(match self.0.get(url) {
                Some(text) => ImageDescription::Described {
                    url: url.to_string(),
                    text: text.to_string(),
                },
                None => ImageDescription::unavailable(url, "HTTP 404"),
            })
        }
    }

    struct FatalDescriber;

    #[async_trait]
    impl ImageDescriber for FatalDescriber {
        async fn describe(&self, _url: &str) -> Result<ImageDescription, PipelineError> {
            Err(PipelineError::Llm {
                message: "HTTP 401".to_string(),
                status_code: Some(401),
            })
        }
    }

    struct MapExtractor(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl LinkExtractor for MapExtractor {
        async fn extract(&self, url: &str) -> LinkExtraction {
            match self.0.get(url) {
                Some(text) => LinkExtraction::Extracted(crate::link::LinkContent {
                    url: url.to_string(),
                    title: None,
                    description: None,
                    content: text.to_string(),
                }),
                None => LinkExtraction::unavailable(url, "connection refused"),
            }
        }
    }

    fn pipeline(embedder: Arc<dyn TextEmbedder>) -> RelevancePipeline {
        RelevancePipeline::new(
            embedder,
            Box::new(MapExtractor(HashMap::from([(
                "https://example.com/page",
                "Fixing layout issues in the sidebar",
            )]))),
            RelevanceCombinator::default(),
        )
        .with_describer(Box::new(MapDescriber(HashMap::from([
            ("https://example.com/ui.png", "a screenshot of the ui layout"),
            ("https://example.com/cat.png", "a cat on a sofa"),
        ]))))
    }

    #[tokio::test]
    async fn test_no_attachments_scores_zero() {
        let report = pipeline(Arc::new(WordEmbedder))
            .score(&Comment::new("layout issues in the UI"))
            .await
            .unwrap();
        assert_eq!(report.score, 0.0);
        assert!(report.items.is_empty());
        assert_eq!(report.image_similarity, None);
    }

    #[tokio::test]
    async fn test_scores_images_and_links() {
        let comment = Comment::new("This comment addresses layout issues in the UI.")
            .with_images(["https://example.com/ui.png"])
            .with_links(["https://example.com/page"]);
        let report = pipeline(Arc::new(WordEmbedder)).score(&comment).await.unwrap();

        assert!(report.score > 0.0 && report.score < 1.0, "score {}", report.score);
        assert_eq!(report.scored_count(), 2);
        let expected = 0.5 * report.image_similarity.unwrap() + 0.5 * report.link_similarity.unwrap();
        assert!((report.score - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_failed_image_does_not_abort_others() {
        let comment = Comment::new("layout issues in the UI").with_images([
            "https://example.com/ui.png",
            "https://example.com/missing.png",
            "https://example.com/cat.png",
        ]);
        let report = pipeline(Arc::new(WordEmbedder)).score(&comment).await.unwrap();

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.scored_count(), 2);
        assert!(matches!(
            &report.items[1].outcome,
            ModalityOutcome::Missing { reason } if reason == "HTTP 404"
        ));
        // Best image is the UI screenshot, not the cat
        assert_eq!(report.image_similarity, report.items[0].similarity());
    }

    #[tokio::test]
    async fn test_captioning_disabled_marks_images_missing() {
        let pipeline = RelevancePipeline::new(
            Arc::new(WordEmbedder),
            Box::new(MapExtractor(HashMap::new())),
            RelevanceCombinator::default(),
        );
        assert!(!pipeline.captioning_enabled());

        let report = pipeline
            .score(&Comment::new("layout").with_images(["https://example.com/ui.png"]))
            .await
            .unwrap();
        assert_eq!(report.score, 0.0);
        assert!(matches!(
            &report.items[0].outcome,
            ModalityOutcome::Missing { reason } if reason == "captioning disabled"
        ));
    }

    #[tokio::test]
    async fn test_embedder_failure_is_fatal() {
        let err = pipeline(Arc::new(FailingEmbedder))
            .score(&Comment::new("layout"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Model { .. }));
    }

    #[tokio::test]
    async fn test_captioning_provider_failure_is_fatal() {
        let pipeline = RelevancePipeline::new(
            Arc::new(WordEmbedder),
            Box::new(MapExtractor(HashMap::new())),
            RelevanceCombinator::default(),
        )
        .with_describer(Box::new(FatalDescriber));

        let err = pipeline
            .score(&Comment::new("layout").with_images(["https://example.com/ui.png"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Llm { status_code: Some(401), .. }));
    }
}
