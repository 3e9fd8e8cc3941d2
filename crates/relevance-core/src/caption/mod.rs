//! Image description: turns an image URL into a short caption.
//!
//! ```text
//! URL → fetch → image/* check → decode (validate, PNG if needed) → vision LLM → caption
//! ```
//!
//! Everything before the LLM call is best effort: a broken URL or a non-image
//! response yields [`ImageDescription::Unavailable`]. A failing captioning
//! model is returned as an error because no image can be described without it.

pub mod decode;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{CaptionConfig, LimitsConfig};
use crate::error::PipelineError;
use crate::fetch::HttpFetcher;
use crate::llm::{ImageInput, LlmProvider, LlmRequest};

use self::decode::{format_to_string, ImageDecoder};

/// Result of describing one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageDescription {
    Described { url: String, text: String },
    Unavailable { url: String, reason: String },
}

impl ImageDescription {
    pub fn unavailable(url: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Anything that can produce a caption for an image URL.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    /// Describe the image behind `url`.
    ///
    /// Returns `Err` only for failures that make captioning impossible for
    /// every image (model or provider errors).
    async fn describe(&self, url: &str) -> Result<ImageDescription, PipelineError>;
}

/// Captions images with a vision LLM provider.
pub struct ImageCaptioner {
    fetcher: HttpFetcher,
    decoder: ImageDecoder,
    provider: Box<dyn LlmProvider>,
    caption: CaptionConfig,
}

impl ImageCaptioner {
    pub fn new(
        fetcher: HttpFetcher,
        limits: LimitsConfig,
        provider: Box<dyn LlmProvider>,
        caption: CaptionConfig,
    ) -> Self {
        Self {
            fetcher,
            decoder: ImageDecoder::new(limits),
            provider,
            caption,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl ImageDescriber for ImageCaptioner {
    async fn describe(&self, url: &str) -> Result<ImageDescription, PipelineError> {
        tracing::info!("Fetching image from URL: {url}");

        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .and_then(|resource| resource.require_image());
        let resource = match fetched {
            Ok(resource) => resource,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Error processing image {url}: {e}");
                return Ok(ImageDescription::unavailable(url, e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let decoded = match self.decoder.decode(&resource.bytes, url).await {
            Ok(decoded) => decoded,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Error processing image {url}: {e}");
                return Ok(ImageDescription::unavailable(url, e.to_string()));
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(
            "Decoded {url}: {}x{} {:?}",
            decoded.width,
            decoded.height,
            decoded.format
        );

        let image = ImageInput::from_bytes(
            &decoded.payload,
            &format_to_string(decoded.payload_format),
        );
        let request = LlmRequest::caption(image, &self.caption);

        let response = match tokio::time::timeout(
            self.provider.timeout(),
            self.provider.generate(&request),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(PipelineError::Llm {
                    message: format!(
                        "{} timed out after {}ms captioning {url}",
                        self.provider.name(),
                        self.provider.timeout().as_millis()
                    ),
                    status_code: None,
                })
            }
        };

        tracing::debug!(
            "Captioned {url} with {} in {}ms ({} tokens)",
            response.model,
            response.latency_ms,
            response
                .tokens_used
                .map_or_else(|| "?".to_string(), |t| t.to_string())
        );

        let text = response.text.trim();
        if text.is_empty() {
            return Ok(ImageDescription::unavailable(url, "empty caption"));
        }

        Ok(ImageDescription::Described {
            url: url.to_string(),
            text: text.to_string(),
        })
    }
}
