//! Configuration management.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, so a missing or partial file is always usable.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Sentence embedding settings
    pub embedding: EmbeddingConfig,

    /// HTTP fetch settings
    pub fetch: FetchConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Link extraction settings
    pub link: LinkConfig,

    /// Image captioning settings
    pub caption: CaptionConfig,

    /// Score combination settings
    pub scoring: ScoringConfig,

    /// GitHub API settings
    pub github: GitHubConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.relevance.relevance/config.toml
    /// - Linux: ~/.config/relevance/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\relevance\config\config.toml
    ///
    /// Falls back to ~/.relevance/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "relevance", "relevance")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".relevance").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory holding the configured sentence embedding model.
    pub fn embedding_model_dir(&self) -> PathBuf {
        self.model_dir().join(&self.embedding.model)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
