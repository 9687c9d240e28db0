//! Sentence embeddings from a BERT-family encoder.
//!
//! Loads a sentence-transformers checkpoint (`config.json`, `tokenizer.json`,
//! `model.safetensors`) from the HuggingFace hub or a local directory and
//! embeds text by mean pooling the last hidden state over the attention mask,
//! followed by L2 normalization. The default model is `all-MiniLM-L6-v2`
//! (384 dimensions).

use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::api::sync::ApiBuilder;
use serde::Deserialize;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use super::embed::TextEmbedder;
use crate::error::{Error, Result};

/// HuggingFace id of the default sentence model.
pub const DEFAULT_SENTENCE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Longer inputs are truncated; headings never get close.
const MAX_SEQ_LEN: usize = 256;

const MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];

#[derive(Deserialize)]
struct HiddenSize {
    hidden_size: usize,
}

/// Sentence embedder running a BERT encoder on the CPU with candle.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimensions: usize,
    model_id: String,
}

impl BertEmbedder {
    /// Load [`DEFAULT_SENTENCE_MODEL`].
    pub fn new() -> Result<Self> {
        Self::from_pretrained(DEFAULT_SENTENCE_MODEL)
    }

    /// Load from a local model directory or a HuggingFace model id.
    pub fn from_pretrained(model_id: &str) -> Result<Self> {
        let path = Path::new(model_id);
        if path.is_dir() {
            return Self::from_dir(path);
        }

        let api = ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(embedding_error)?;
        let repo = api.model(model_id.to_string());

        log::info!("fetching sentence model {}", model_id);
        let [config, tokenizer, weights] = MODEL_FILES;
        let config_path = repo.get(config).map_err(embedding_error)?;
        let tokenizer_path = repo.get(tokenizer).map_err(embedding_error)?;
        let weights_path = repo.get(weights).map_err(embedding_error)?;

        Self::from_files(&config_path, &tokenizer_path, &weights_path, model_id)
    }

    /// Load from a directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let [config, tokenizer, weights] = MODEL_FILES.map(|file| dir.join(file));
        for path in [&config, &tokenizer, &weights] {
            if !path.is_file() {
                return Err(Error::Embedding(format!(
                    "{} not found; expected {}",
                    path.display(),
                    MODEL_FILES.join(", ")
                )));
            }
        }
        Self::from_files(&config, &tokenizer, &weights, &dir.display().to_string())
    }

    /// Load from explicit file paths.
    pub fn from_files(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
        model_id: &str,
    ) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_json)?;
        let HiddenSize { hidden_size } = serde_json::from_str(&config_json)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(embedding_error)?;
        tokenizer.with_padding(Some(PaddingParams::default()));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(embedding_error)?;

        let device = Device::Cpu;
        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        // Checkpoints exported from BertForX carry a "bert." prefix
        let model = BertModel::load(vb.pp("bert"), &config).or_else(|_| BertModel::load(vb, &config))?;

        log::debug!("loaded {} ({} dimensions)", model_id, hidden_size);
        Ok(Self {
            model,
            tokenizer,
            device,
            dimensions: hidden_size,
            model_id: model_id.to_string(),
        })
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(embedding_error)?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = mean_pool(&hidden, &attention_mask)?;
        Ok(l2_normalize(&pooled)?.to_vec2::<f32>()?)
    }
}

impl TextEmbedder for BertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(&[text])?
            .pop()
            .ok_or_else(|| Error::Embedding("empty batch result".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model_id
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.encode(texts)
    }
}

fn embedding_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Embedding(err.to_string())
}

/// Average `[batch, seq, hidden]` over the unmasked tokens of each row.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?;
    summed.broadcast_div(&counts)
}

/// L2 normalize each row of a 2D tensor.
fn l2_normalize(tensor: &Tensor) -> candle_core::Result<Tensor> {
    let norm = tensor
        .sqr()?
        .sum_keepdim(1)?
        .sqrt()?
        .broadcast_add(&Tensor::new(&[1e-12f32], tensor.device())?)?;
    tensor.broadcast_div(&norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_padding() {
        let device = Device::Cpu;
        let hidden = Tensor::new(
            &[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]],
            &device,
        )
        .unwrap();
        let mask = Tensor::new(&[[1u32, 1, 0]], &device).unwrap();

        let pooled: Vec<Vec<f32>> = mean_pool(&hidden, &mask).unwrap().to_vec2().unwrap();
        assert_eq!(pooled, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_l2_normalize_rows() {
        let device = Device::Cpu;
        let tensor = Tensor::new(&[[3.0f32, 4.0], [0.0, 2.0]], &device).unwrap();

        let rows: Vec<Vec<f32>> = l2_normalize(&tensor).unwrap().to_vec2().unwrap();
        assert!((rows[0][0] - 0.6).abs() < 1e-5);
        assert!((rows[0][1] - 0.8).abs() < 1e-5);
        assert!((rows[1][1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_from_dir_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = BertEmbedder::from_dir(dir.path()).err().unwrap();
        match err {
            Error::Embedding(msg) => assert!(msg.contains("tokenizer.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
