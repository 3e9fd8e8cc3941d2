//! The `relevance annotate` command: automation mode for GitHub workflows.

use clap::Args;
use relevance_core::{annotate_comment, AutomationConfig, Config, GitHubClient};

use super::setup::build_pipeline;
use super::types::LlmProvider;

/// Arguments for the `annotate` command.
///
/// Every target argument falls back to the environment a GitHub Actions job
/// provides.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// GitHub token with permission to edit issue comments
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Repository as `owner/name`
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Issue (or pull request) number the comment belongs to
    #[arg(long, env = "ISSUE_NUMBER")]
    pub issue_number: u64,

    /// Comment to score and annotate
    #[arg(long, env = "COMMENT_ID")]
    pub comment_id: u64,

    /// Score and print the new body without updating the comment
    #[arg(long)]
    pub dry_run: bool,

    /// Vision LLM provider for image captions
    #[arg(long, value_enum)]
    pub llm: Option<LlmProvider>,

    /// LLM model name (provider-specific)
    #[arg(long)]
    pub llm_model: Option<String>,
}

impl AnnotateArgs {
    fn automation_config(&self) -> AutomationConfig {
        AutomationConfig {
            token: self.token.clone(),
            repository: self.repository.clone(),
            issue_number: self.issue_number,
            comment_id: self.comment_id,
        }
    }
}

/// Execute the annotate command.
pub async fn execute(args: AnnotateArgs, config: Config) -> anyhow::Result<()> {
    let automation = args.automation_config();
    automation.validate()?;

    let client = GitHubClient::new(&config.github.api_url, &automation.token)?;
    let pipeline = build_pipeline(&config, args.llm, args.llm_model.as_deref()).await?;

    let outcome = annotate_comment(&client, &pipeline, &automation, args.dry_run).await?;

    if args.dry_run {
        println!("{}", outcome.body);
    } else {
        println!("{}", outcome.score);
    }
    Ok(())
}
