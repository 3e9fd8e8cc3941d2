//! Error types for the relevance scoring pipeline.
//!
//! Errors are organized by stage so a caller can tell a skippable attachment
//! failure (bad URL, wrong content type, undecodable image) from a failure that
//! makes the whole score uncomputable (embedder or captioning model errors).

use thiserror::Error;

/// Top-level error type for relevance operations.
#[derive(Error, Debug)]
pub enum RelevanceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// GitHub API errors (automation mode)
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network failure or non-success HTTP status while fetching an attachment
    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The resource is not of the expected kind (image for images, HTML for links)
    #[error("Unexpected content type for {url}: {content_type}")]
    UnsupportedContent { url: String, content_type: String },

    /// Response body exceeds the configured size cap
    #[error("Response too large: {url} ({size_bytes} bytes > {max_bytes} bytes)")]
    TooLarge {
        url: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {url} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        url: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {url} after {timeout_ms}ms")]
    Timeout {
        url: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Model loading or inference failed
    #[error("Model error: {message}")]
    Model { message: String },

    /// Captioning LLM call failed
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },
}

impl PipelineError {
    /// Whether this failure only disqualifies the attachment it came from.
    ///
    /// Fetch, content, size, decode and timeout failures are recoverable: the
    /// attachment contributes nothing. Model and LLM failures mean no score can
    /// be computed for the comment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Fetch { .. }
                | PipelineError::UnsupportedContent { .. }
                | PipelineError::TooLarge { .. }
                | PipelineError::Decode { .. }
                | PipelineError::ImageTooLarge { .. }
                | PipelineError::Timeout { .. }
        )
    }
}

/// GitHub API errors.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Request failed or returned a non-success status
    #[error("GitHub request failed: {message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The comment does not belong to the configured issue
    #[error("Comment {comment_id} does not belong to issue #{issue_number} ({issue_url})")]
    IssueMismatch {
        comment_id: u64,
        issue_number: u64,
        issue_url: String,
    },
}

/// Convenience type alias for relevance results.
pub type Result<T> = std::result::Result<T, RelevanceError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_recoverable() {
        let err = PipelineError::Fetch {
            url: "https://example.com/a.png".to_string(),
            message: "HTTP 404 Not Found".to_string(),
            status_code: Some(404),
        };
        assert!(err.is_recoverable());

        let err = PipelineError::UnsupportedContent {
            url: "https://example.com".to_string(),
            content_type: "application/pdf".to_string(),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_model_errors_are_fatal() {
        let err = PipelineError::Model {
            message: "inference failed".to_string(),
        };
        assert!(!err.is_recoverable());

        let err = PipelineError::Llm {
            message: "HTTP 401".to_string(),
            status_code: Some(401),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_messages_include_url() {
        let err = PipelineError::Decode {
            url: "https://example.com/broken.jpg".to_string(),
            message: "invalid header".to_string(),
        };
        assert!(err.to_string().contains("broken.jpg"));
    }
}
