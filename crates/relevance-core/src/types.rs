//! Core data types for a single scoring run.
//!
//! Everything here lives for one comment: it is built, scored, reported and
//! dropped.

use serde::{Deserialize, Serialize};

use crate::github::annotation::strip_annotation;
use crate::pipeline::attachments::Attachments;
use crate::scoring::MissingModalityPolicy;

/// A comment and the attachments it references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body used for the text embedding
    pub text: String,

    /// Image URLs attached to the comment
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Link URLs referenced by the comment
    #[serde(default)]
    pub link_urls: Vec<String>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_images<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn with_links<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Build a comment from a GitHub markdown body.
    ///
    /// Images and links are discovered in the body; a previous relevance
    /// annotation is stripped so re-scoring an annotated comment is stable.
    pub fn from_markdown(body: &str) -> Self {
        let text = strip_annotation(body).to_string();
        let attachments = Attachments::extract(&text);
        Self {
            text,
            image_urls: attachments.images,
            link_urls: attachments.links,
        }
    }
}

/// Which side channel an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Link,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modality::Image => write!(f, "image"),
            Modality::Link => write!(f, "link"),
        }
    }
}

/// Outcome of processing one attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModalityOutcome {
    /// A description or page text was obtained and compared to the comment
    Scored { content: String, similarity: f32 },
    /// Nothing usable; the attachment contributes no similarity
    Missing { reason: String },
}

/// One processed image or link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityResult {
    pub modality: Modality,
    pub url: String,
    #[serde(flatten)]
    pub outcome: ModalityOutcome,
}

impl ModalityResult {
    pub fn similarity(&self) -> Option<f32> {
        match self.outcome {
            ModalityOutcome::Scored { similarity, .. } => Some(similarity),
            ModalityOutcome::Missing { .. } => None,
        }
    }
}

/// The scored result for one comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceReport {
    /// Final relevance score
    pub score: f32,

    /// Best image similarity, if any image was usable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_similarity: Option<f32>,

    /// Best link similarity, if any link was usable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_similarity: Option<f32>,

    /// Policy applied to missing modalities
    pub missing_modality: MissingModalityPolicy,

    /// Per-attachment outcomes in input order (images first, then links)
    pub items: Vec<ModalityResult>,
}

impl RelevanceReport {
    /// Attachments that contributed a similarity.
    pub fn scored_count(&self) -> usize {
        self.items.iter().filter(|i| i.similarity().is_some()).count()
    }
}
