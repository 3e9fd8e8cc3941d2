//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.max_length must be > 0".into(),
            ));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0".into(),
            ));
        }
        if self.fetch.max_response_mb == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.max_response_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.link.char_limit == 0 {
            return Err(ConfigError::ValidationError(
                "link.char_limit must be > 0".into(),
            ));
        }
        if self.caption.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "caption.max_tokens must be > 0".into(),
            ));
        }
        let weights = [self.scoring.image_weight, self.scoring.link_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::ValidationError(
                "scoring weights must be finite and >= 0.0".into(),
            ));
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring weights must not both be 0.0".into(),
            ));
        }
        Ok(())
    }
}
