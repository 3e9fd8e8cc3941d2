//! all-MiniLM-L6-v2 sentence encoder.
//!
//! Loads the BERT-style ONNX export and its tokenizer, runs one text at a
//! time, mean-pools the last hidden state over the attention mask and
//! L2-normalizes the result into a 384-dimensional vector.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::PipelineError;
use crate::math::l2_normalize_in_place;

use super::TextEmbedder;

/// ONNX model filename inside the model directory.
pub const MODEL_FILENAME: &str = "model.onnx";

/// Tokenizer filename inside the model directory.
pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Output dimension of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Sentence embedder backed by a local ONNX session.
///
/// The session is behind a `Mutex` because `Session::run` needs `&mut self`.
pub struct SentenceEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl SentenceEmbedder {
    /// Load the model and tokenizer from `model_dir`.
    ///
    /// Inputs longer than `max_length` tokens are truncated.
    pub fn load(model_dir: &Path, max_length: usize) -> Result<Self, PipelineError> {
        let model_path = model_dir.join(MODEL_FILENAME);
        let tokenizer_path = model_dir.join(TOKENIZER_FILENAME);

        if !model_path.exists() {
            return Err(PipelineError::Model {
                message: format!(
                    "Embedding model not found at {:?}. Run `relevance models download` first.",
                    model_path
                ),
            });
        }

        if !tokenizer_path.exists() {
            return Err(PipelineError::Model {
                message: format!(
                    "Tokenizer not found at {:?}. Run `relevance models download` first.",
                    tokenizer_path
                ),
            });
        }

        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load embedding model: {e}"),
            })?;

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| PipelineError::Model {
                message: format!("Failed to load tokenizer: {e}"),
            })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to configure truncation: {e}"),
            })?;
        // Single inputs only, so padding is never needed.
        tokenizer.with_padding(None);

        tracing::debug!(
            "Loaded sentence embedder (inputs: {:?}, outputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Check whether the model files exist.
    pub fn model_exists(model_dir: &Path) -> bool {
        model_dir.join(MODEL_FILENAME).exists() && model_dir.join(TOKENIZER_FILENAME).exists()
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Model {
                message: format!("Tokenization failed: {e}"),
            })?;

        let seq_len = encoding.get_ids().len();
        if seq_len == 0 {
            return Ok(vec![0.0; EMBEDDING_DIM]);
        }

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids = vec![0i64; seq_len];
        let shape = vec![1i64, seq_len as i64];

        let tensor = |name: &str, data: Vec<i64>| {
            Value::from_array((shape.clone(), data)).map_err(|e| PipelineError::Model {
                message: format!("Failed to create {name} tensor: {e}"),
            })
        };
        let inputs = ort::inputs![
            "input_ids" => tensor("input_ids", input_ids)?,
            "attention_mask" => tensor("attention_mask", attention_mask.clone())?,
            "token_type_ids" => tensor("token_type_ids", token_type_ids)?
        ];

        let mut session = self.session.lock().map_err(|e| PipelineError::Model {
            message: format!("Embedding session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Model {
            message: format!("Embedding inference failed: {e}"),
        })?;

        // last_hidden_state: [1, seq_len, dim]
        let hidden = outputs
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| outputs.iter().next())
            .ok_or_else(|| PipelineError::Model {
                message: "Embedding model produced no outputs".to_string(),
            })?;

        let (_shape, data) =
            hidden
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Model {
                    message: format!("Failed to extract last_hidden_state: {e}"),
                })?;

        let mut pooled = mean_pool(data, &attention_mask, seq_len)?;
        l2_normalize_in_place(&mut pooled);
        Ok(pooled)
    }
}

/// Average token vectors weighted by the attention mask.
///
/// `hidden` is a flat `[seq_len, dim]` buffer for a single input.
pub(crate) fn mean_pool(
    hidden: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
) -> Result<Vec<f32>, PipelineError> {
    if seq_len == 0 || hidden.len() % seq_len != 0 {
        return Err(PipelineError::Model {
            message: format!(
                "Hidden state of length {} does not divide into {seq_len} tokens",
                hidden.len()
            ),
        });
    }
    let dim = hidden.len() / seq_len;

    let mut sum = vec![0.0_f32; dim];
    let mut mask_sum = 0.0_f32;
    for (token, &mask) in hidden.chunks(dim).zip(attention_mask) {
        if mask > 0 {
            let weight = mask as f32;
            mask_sum += weight;
            for (acc, &v) in sum.iter_mut().zip(token) {
                *acc += v * weight;
            }
        }
    }

    if mask_sum > 0.0 {
        for v in &mut sum {
            *v /= mask_sum;
        }
    }
    Ok(sum)
}
