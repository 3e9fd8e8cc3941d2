//! The `relevance score` command.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Args;
use relevance_core::{Comment, Config, RelevancePipeline, ReportWriter};

use super::setup::build_pipeline;
use super::types::{LlmProvider, OutputFormat};

/// Arguments for the `score` command.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Comment text
    #[arg(required_unless_present = "input", conflicts_with = "input")]
    pub text: Option<String>,

    /// Treat the text as a markdown comment body and discover its attachments
    #[arg(long)]
    pub markdown: bool,

    /// Image URL attached to the comment (repeatable)
    #[arg(long = "image", value_name = "URL")]
    pub images: Vec<String>,

    /// Link URL referenced by the comment (repeatable)
    #[arg(long = "link", value_name = "URL")]
    pub links: Vec<String>,

    /// JSONL file of `{"text", "image_urls", "link_urls"}` records to score
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Vision LLM provider for image captions
    #[arg(long, value_enum)]
    pub llm: Option<LlmProvider>,

    /// LLM model name (provider-specific)
    #[arg(long)]
    pub llm_model: Option<String>,
}

/// Execute the score command.
pub async fn execute(args: ScoreArgs, config: Config) -> anyhow::Result<()> {
    let comments = match &args.input {
        Some(path) => read_comments(path)?,
        None => vec![build_comment(&args)],
    };

    let pipeline = build_pipeline(&config, args.llm, args.llm_model.as_deref()).await?;
    let stdout = std::io::stdout().lock();
    let mut writer = ReportWriter::new(stdout, args.format.into());

    if comments.len() == 1 {
        let report = pipeline.score(&comments[0]).await?;
        writer.write(&report)?;
        writer.finish()?;
        return Ok(());
    }

    score_batch(&pipeline, &comments, &mut writer).await?;
    writer.finish()?;
    Ok(())
}

/// Score every comment, continuing past failures.
async fn score_batch<W: std::io::Write>(
    pipeline: &RelevancePipeline,
    comments: &[Comment],
    writer: &mut ReportWriter<W>,
) -> anyhow::Result<()> {
    let progress = create_progress_bar(comments.len() as u64);
    let mut failed = 0usize;

    for (i, comment) in comments.iter().enumerate() {
        match pipeline.score(comment).await {
            Ok(report) => writer.write(&report)?,
            Err(e) => {
                failed += 1;
                progress.suspend(|| tracing::error!("Comment {} failed: {e}", i + 1));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let succeeded = comments.len() - failed;
    tracing::info!("Scored {succeeded}/{} comments", comments.len());
    if failed > 0 {
        anyhow::bail!("{failed} of {} comments could not be scored", comments.len());
    }
    Ok(())
}

fn build_comment(args: &ScoreArgs) -> Comment {
    let text = args.text.clone().unwrap_or_default();
    let comment = if args.markdown {
        Comment::from_markdown(&text)
    } else {
        Comment::new(text)
    };
    comment
        .with_images(args.images.iter().cloned())
        .with_links(args.links.iter().cloned())
}

/// Read one comment per non-empty line.
fn read_comments(path: &Path) -> anyhow::Result<Vec<Comment>> {
    let file = std::fs::File::open(path).map_err(|e| {
        anyhow::anyhow!(
            "Cannot open input file {:?}: {e}\n\n  Hint: Check the file path and try again.",
            path
        )
    })?;

    let mut comments = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let comment: Comment = serde_json::from_str(&line)
            .map_err(|e| anyhow::anyhow!("{}:{}: invalid comment record: {e}", path.display(), i + 1))?;
        comments.push(comment);
    }

    if comments.is_empty() {
        anyhow::bail!("No comments found in {}", path.display());
    }
    Ok(comments)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
