//! The `relevance models` command for managing the sentence embedding model.

use std::path::Path;

use clap::{Args, Subcommand};
use relevance_core::embedding::minilm::{MODEL_FILENAME, TOKENIZER_FILENAME};
use relevance_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the embedding model and tokenizer
    Download {
        /// Re-download files that already exist
        #[arg(long)]
        force: bool,
    },

    /// List installed model files
    List,

    /// Show model directory path
    Path,
}

/// Hugging Face repository hosting the ONNX export.
const MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// A file to fetch: path inside the repo, local filename.
struct ModelFile {
    remote_path: &'static str,
    local_name: &'static str,
}

const MODEL_FILES: &[ModelFile] = &[
    ModelFile {
        remote_path: "onnx/model.onnx",
        local_name: MODEL_FILENAME,
    },
    ModelFile {
        remote_path: "tokenizer.json",
        local_name: TOKENIZER_FILENAME,
    },
];

fn remote_url(file: &ModelFile) -> String {
    format!(
        "https://huggingface.co/{MODEL_REPO}/resolve/main/{}",
        file.remote_path
    )
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    let model_dir = config.embedding_model_dir();

    match args.command {
        ModelsCommand::Download { force } => {
            std::fs::create_dir_all(&model_dir)?;
            let client = reqwest::Client::new();

            for file in MODEL_FILES {
                let dest = model_dir.join(file.local_name);
                if dest.exists() && !force {
                    tracing::info!("{} already exists at {:?}", file.local_name, dest);
                    continue;
                }

                let url = remote_url(file);
                tracing::info!("Downloading {}...", file.local_name);
                tracing::info!("  Source: {}", url);
                tracing::info!("  Destination: {:?}", dest);

                download_file(&client, &url, &dest).await?;

                let file_size = std::fs::metadata(&dest)?.len();
                tracing::info!(
                    "  {} complete ({:.1} MB)",
                    file.local_name,
                    file_size as f64 / (1024.0 * 1024.0)
                );
            }

            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            if !model_dir.exists() {
                println!("No models installed.");
                println!("Run `relevance models download` to download the embedding model.");
                return Ok(());
            }

            println!("Embedding model: {}", config.embedding.model);
            println!("  Directory: {}\n", model_dir.display());
            for file in MODEL_FILES {
                println!(
                    "    - {:20} {}",
                    file.local_name,
                    status_label(&model_dir.join(file.local_name))
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", model_dir.display());
        }
    }

    Ok(())
}

fn status_label(path: &Path) -> &'static str {
    if path.exists() {
        "ready"
    } else {
        "not installed"
    }
}

/// Download a file to `<dest>.part`, then rename it into place.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let progress = match response.content_length() {
        Some(total) => download_bar(total),
        None => indicatif::ProgressBar::new_spinner(),
    };

    let partial = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await?;
    drop(file);
    progress.finish_and_clear();

    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}

fn download_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_urls() {
        assert_eq!(
            remote_url(&MODEL_FILES[0]),
            "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx"
        );
        assert!(remote_url(&MODEL_FILES[1]).ends_with("/tokenizer.json"));
    }

    #[test]
    fn test_local_names_match_embedder() {
        let names: Vec<_> = MODEL_FILES.iter().map(|f| f.local_name).collect();
        assert_eq!(names, vec!["model.onnx", "tokenizer.json"]);
    }

    #[test]
    fn test_status_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        assert_eq!(status_label(&path), "not installed");
        std::fs::write(&path, b"onnx").unwrap();
        assert_eq!(status_label(&path), "ready");
    }
}
