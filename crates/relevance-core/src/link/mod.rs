//! Link extraction: turns a URL into page text suitable for embedding.
//!
//! Only HTML pages are considered. Any fetch or content-type failure is
//! reported as [`LinkExtraction::Unavailable`] with the reason, never as page
//! content.

pub mod html;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::LinkConfig;
use crate::fetch::HttpFetcher;

use self::html::extract_page_text;

/// Text recovered from a linked page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visible text, truncated to the configured limit
    pub content: String,
}

impl LinkContent {
    /// The text that gets embedded for this link.
    ///
    /// With `include_metadata` the title and description lead the body.
    pub fn embedding_text(&self, include_metadata: bool) -> String {
        if !include_metadata {
            return self.content.clone();
        }
        [
            self.title.as_deref(),
            self.description.as_deref(),
            Some(self.content.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Result of extracting one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LinkExtraction {
    Extracted(LinkContent),
    Unavailable { url: String, reason: String },
}

impl LinkExtraction {
    pub fn unavailable(url: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Anything that can turn a URL into page text.
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> LinkExtraction;
}

/// Fetches HTML pages and strips them to text.
pub struct HtmlLinkExtractor {
    fetcher: HttpFetcher,
    char_limit: usize,
}

impl HtmlLinkExtractor {
    pub fn new(fetcher: HttpFetcher, config: &LinkConfig) -> Self {
        Self {
            fetcher,
            char_limit: config.char_limit,
        }
    }
}

#[async_trait]
impl LinkExtractor for HtmlLinkExtractor {
    async fn extract(&self, url: &str) -> LinkExtraction {
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .and_then(|resource| resource.require_html());
        let resource = match fetched {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!("Error extracting content from {url}: {e}");
                return LinkExtraction::unavailable(url, e.to_string());
            }
        };

        let page = extract_page_text(&resource.text(), self.char_limit);
        tracing::debug!(
            "Extracted {} chars from {url} (title: {:?})",
            page.content.chars().count(),
            page.title
        );

        LinkExtraction::Extracted(LinkContent {
            url: url.to_string(),
            title: page.title,
            description: page.description,
            content: page.content,
        })
    }
}
