//! Automation mode: score a GitHub issue comment and write the score back.
//!
//! ```text
//! GET comment → check issue → Comment::from_markdown → score → PATCH body + marker
//! ```

pub mod annotation;
pub mod client;

use serde::Serialize;

use crate::error::{ConfigError, GitHubError, RelevanceError};
use crate::pipeline::RelevancePipeline;
use crate::types::{Comment, RelevanceReport};

pub use self::annotation::{annotate, parse_annotation, strip_annotation};
pub use self::client::{GitHubClient, IssueComment};

/// Which comment to annotate, and the credentials to do it.
#[derive(Clone)]
pub struct AutomationConfig {
    pub token: String,
    /// `owner/name`
    pub repository: String,
    pub issue_number: u64,
    pub comment_id: u64,
}

impl std::fmt::Debug for AutomationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationConfig")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("issue_number", &self.issue_number)
            .field("comment_id", &self.comment_id)
            .finish()
    }
}

impl AutomationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "GitHub token is empty".to_string(),
            ));
        }
        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "repository must be `owner/name`, got {:?}",
                    self.repository
                )))
            }
        }
        if self.issue_number == 0 {
            return Err(ConfigError::ValidationError(
                "issue number must be positive".to_string(),
            ));
        }
        if self.comment_id == 0 {
            return Err(ConfigError::ValidationError(
                "comment id must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// What happened to one annotated comment.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationOutcome {
    pub comment_id: u64,
    pub score: f32,
    /// Body that was (or, in a dry run, would have been) written
    pub body: String,
    /// False for dry runs
    pub written: bool,
    pub report: RelevanceReport,
}

/// Score a comment and append the relevance marker to its body.
pub async fn annotate_comment(
    client: &GitHubClient,
    pipeline: &RelevancePipeline,
    config: &AutomationConfig,
    dry_run: bool,
) -> Result<AnnotationOutcome, RelevanceError> {
    config.validate()?;

    let comment = client
        .get_comment(&config.repository, config.comment_id)
        .await?;
    if !comment.belongs_to_issue(config.issue_number) {
        return Err(GitHubError::IssueMismatch {
            comment_id: config.comment_id,
            issue_number: config.issue_number,
            issue_url: comment.issue_url,
        }
        .into());
    }

    let body = comment.body.unwrap_or_default();
    if let Some(previous) = parse_annotation(&body) {
        tracing::info!("Comment {} already annotated ({previous}), re-scoring", config.comment_id);
    }

    let input = Comment::from_markdown(&body);
    tracing::info!(
        "Scoring comment {} ({} images, {} links)",
        config.comment_id,
        input.image_urls.len(),
        input.link_urls.len()
    );
    let report = pipeline.score(&input).await?;
    let new_body = annotate(&body, report.score);

    let written = if dry_run {
        tracing::info!("Dry run: not updating comment {}", config.comment_id);
        false
    } else {
        client
            .update_comment(&config.repository, config.comment_id, &new_body)
            .await?;
        tracing::info!(
            "Updated comment {} with relevance score {}",
            config.comment_id,
            report.score
        );
        true
    };

    Ok(AnnotationOutcome {
        comment_id: config.comment_id,
        score: report.score,
        body: new_body,
        written,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AutomationConfig {
        AutomationConfig {
            token: "ghp_test".to_string(),
            repository: "octo/app".to_string(),
            issue_number: 3,
            comment_id: 99,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_repository() {
        for repo in ["octo", "octo/", "/app", "octo/app/extra"] {
            let cfg = AutomationConfig {
                repository: repo.to_string(),
                ..config()
            };
            assert!(cfg.validate().is_err(), "{repo} should be rejected");
        }
    }

    #[test]
    fn test_rejects_empty_token_and_zero_ids() {
        assert!(AutomationConfig {
            token: " ".to_string(),
            ..config()
        }
        .validate()
        .is_err());
        assert!(AutomationConfig {
            issue_number: 0,
            ..config()
        }
        .validate()
        .is_err());
        assert!(AutomationConfig {
            comment_id: 0,
            ..config()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("ghp_test"));
        assert!(debug.contains("octo/app"));
    }
}
