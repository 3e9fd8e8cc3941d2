//! Pipeline setup shared by `score` and `annotate`: load the embedder once,
//! pick the captioning provider, wire everything into a `RelevancePipeline`.

use std::sync::Arc;
use std::time::Duration;

use relevance_core::llm::{LlmProvider as CoreLlmProvider, LlmProviderFactory};
use relevance_core::{Config, RelevancePipeline, SentenceEmbedder};

use super::types::LlmProvider;

/// Build the scoring pipeline.
///
/// `--llm` wins over `caption.provider` in the config; with neither, images
/// are reported as missing.
pub async fn build_pipeline(
    config: &Config,
    llm: Option<LlmProvider>,
    llm_model: Option<&str>,
) -> anyhow::Result<RelevancePipeline> {
    let model_dir = config.embedding_model_dir();
    if !SentenceEmbedder::model_exists(&model_dir) {
        anyhow::bail!(
            "Embedding model not found in {}\n\n  Hint: Run `relevance models download` first.",
            model_dir.display()
        );
    }
    let embedder = SentenceEmbedder::load(&model_dir, config.embedding.max_length)?;
    tracing::info!("Embedding model loaded from {}", model_dir.display());

    let provider = create_provider(config, llm, llm_model).await?;
    if provider.is_none() {
        tracing::warn!("No captioning provider configured; images will be skipped. Pass --llm to enable.");
    }

    Ok(RelevancePipeline::from_config(
        config,
        Arc::new(embedder),
        provider,
    )?)
}

/// Build the configured provider and warn early when it cannot be reached.
///
/// An unreachable provider is not an error here: the first caption request
/// reports the failure with the provider's own message.
async fn create_provider(
    config: &Config,
    llm: Option<LlmProvider>,
    llm_model: Option<&str>,
) -> anyhow::Result<Option<Box<dyn CoreLlmProvider>>> {
    let Some(name) = provider_name(config, llm) else {
        return Ok(None);
    };

    let timeout = Duration::from_millis(config.limits.llm_timeout_ms);
    let provider = LlmProviderFactory::create(&name, &config.llm, llm_model, timeout)?;
    if provider.is_available().await {
        tracing::info!("Captioning images with {}", provider.name());
    } else {
        tracing::warn!(
            "Captioning provider {} is not available (check its endpoint and API key)",
            provider.name()
        );
    }
    Ok(Some(provider))
}

fn provider_name(config: &Config, llm: Option<LlmProvider>) -> Option<String> {
    llm.map(|p| p.to_string())
        .or_else(|| config.caption.provider.clone())
        .filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_config_provider() {
        let mut config = Config::default();
        config.caption.provider = Some("openai".to_string());
        assert_eq!(
            provider_name(&config, Some(LlmProvider::Ollama)).as_deref(),
            Some("ollama")
        );
        assert_eq!(provider_name(&config, None).as_deref(), Some("openai"));
    }

    #[test]
    fn test_no_provider_by_default() {
        assert_eq!(provider_name(&Config::default(), None), None);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_still_created() {
        let mut config = Config::default();
        config.llm.ollama = Some(relevance_core::config::OllamaConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });

        let provider = create_provider(&config, Some(LlmProvider::Ollama), Some("llava"))
            .await
            .unwrap()
            .expect("provider requested with --llm");
        assert_eq!(provider.name(), "ollama");
        assert!(!provider.is_available().await);
    }

    #[tokio::test]
    async fn test_no_provider_without_flag_or_config() {
        assert!(create_provider(&Config::default(), None, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_model_has_hint() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();

        let err = match build_pipeline(&config, None, None).await {
            Ok(_) => panic!("pipeline should not build without a model"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("relevance models download"));
    }
}
