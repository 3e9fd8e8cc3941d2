//! HTTP fetching for attachments (images and linked pages).
//!
//! One GET per URL, bounded by a timeout and a body size cap. Every failure is
//! reported as a recoverable [`PipelineError`] so callers can skip the item.

use std::time::Duration;

use futures_util::StreamExt;

use crate::config::FetchConfig;
use crate::error::PipelineError;

/// A successfully fetched resource.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub url: String,
    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,
    /// Response body
    pub bytes: Vec<u8>,
}

impl FetchedResource {
    /// Media type without parameters, lowercased (`text/html; charset=utf-8` -> `text/html`).
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(media_type)
    }

    pub fn is_image(&self) -> bool {
        self.media_type()
            .is_some_and(|m| m.starts_with("image/"))
    }

    pub fn is_html(&self) -> bool {
        self.media_type()
            .is_some_and(|m| m == "text/html" || m == "application/xhtml+xml")
    }

    /// Pass the resource through if it is an image, else `UnsupportedContent`.
    pub fn require_image(self) -> Result<Self, PipelineError> {
        if self.is_image() {
            Ok(self)
        } else {
            Err(self.unsupported())
        }
    }

    /// Pass the resource through if it is an HTML page, else `UnsupportedContent`.
    pub fn require_html(self) -> Result<Self, PipelineError> {
        if self.is_html() {
            Ok(self)
        } else {
            Err(self.unsupported())
        }
    }

    fn unsupported(&self) -> PipelineError {
        PipelineError::UnsupportedContent {
            url: self.url.clone(),
            content_type: self
                .content_type
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Strip parameters from a Content-Type value and lowercase it.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Shared HTTP client for attachment fetches.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            timeout: Duration::from_millis(config.timeout_ms),
            max_bytes: config.max_response_mb.saturating_mul(1024 * 1024),
        })
    }

    /// GET a URL and read the whole body, enforcing the size cap.
    pub async fn fetch(&self, url: &str) -> Result<FetchedResource, PipelineError> {
        tracing::debug!("Fetching {url}");

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        if let Some(len) = resp.content_length() {
            if len > self.max_bytes {
                return Err(PipelineError::TooLarge {
                    url: url.to_string(),
                    size_bytes: len,
                    max_bytes: self.max_bytes,
                });
            }
        }

        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        tracing::debug!("Content-Type for {url}: {:?}", content_type);

        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.request_error(url, e))?;
            if bytes.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(PipelineError::TooLarge {
                    url: url.to_string(),
                    size_bytes: bytes.len() as u64 + chunk.len() as u64,
                    max_bytes: self.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedResource {
            url: final_url,
            content_type,
            bytes,
        })
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::Timeout {
                url: url.to_string(),
                stage: "fetch".to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            PipelineError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(content_type: Option<&str>) -> FetchedResource {
        FetchedResource {
            url: "https://example.com".to_string(),
            content_type: content_type.map(String::from),
            bytes: b"<html></html>".to_vec(),
        }
    }

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("text/html; charset=UTF-8"), "text/html");
        assert_eq!(media_type("IMAGE/PNG"), "image/png");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_is_image() {
        assert!(resource(Some("image/png")).is_image());
        assert!(resource(Some("image/svg+xml")).is_image());
        assert!(!resource(Some("text/html")).is_image());
        assert!(!resource(None).is_image());
    }

    #[test]
    fn test_is_html() {
        assert!(resource(Some("text/html; charset=utf-8")).is_html());
        assert!(resource(Some("application/xhtml+xml")).is_html());
        assert!(!resource(Some("text/plain")).is_html());
        assert!(!resource(Some("application/json")).is_html());
        assert!(!resource(None).is_html());
    }

    #[test]
    fn test_require_kind_reports_unsupported_content() {
        assert!(resource(Some("image/webp")).require_image().is_ok());
        assert!(resource(Some("text/html")).require_html().is_ok());

        let err = resource(Some("application/pdf")).require_html().unwrap_err();
        assert!(matches!(
            &err,
            PipelineError::UnsupportedContent { content_type, .. } if content_type == "application/pdf"
        ));
        assert!(err.is_recoverable());

        let err = resource(None).require_image().unwrap_err();
        assert!(err.to_string().contains("https://example.com: none"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_recoverable() {
        let fetcher = HttpFetcher::new(&FetchConfig {
            timeout_ms: 2000,
            ..FetchConfig::default()
        })
        .unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let err = fetcher.fetch("http://127.0.0.1:9/image.png").await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
