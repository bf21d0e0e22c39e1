//! # Sentence Embedding Model
//!
//! A BERT-family sentence encoder (for example
//! `paraphrase-multilingual-MiniLM-L12-v2`) loaded from a local directory
//! holding `config.json`, `tokenizer.json` and `model.safetensors`.
//! Texts are embedded by mean pooling the last hidden state and compared
//! with cosine similarity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bitext_core::{BitextError, Result, SimilarityModel};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::{Tokenizer as HfTokenizer, TruncationParams};
use tracing::{debug, info};

use crate::pooling::{cosine, mean_pool};

/// Longest token sequence fed to the encoder.
pub const MAX_TOKENS: usize = 512;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Mean-pooled BERT sentence embedder.
pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: HfTokenizer,
    device: Device,
    embeddings: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingModel {
    /// Loads the model from `dir` on the CPU.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::ModelLoad` if a file is missing or cannot be
    /// parsed.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_on(dir, Device::Cpu)
    }

    /// Loads the model from `dir` onto `device`.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::ModelLoad` if a file is missing or cannot be
    /// parsed.
    pub fn load_on(dir: impl AsRef<Path>, device: Device) -> Result<Self> {
        let dir = dir.as_ref();
        let config_path = required(dir, CONFIG_FILE)?;
        let tokenizer_path = required(dir, TOKENIZER_FILE)?;
        let weights_path = required(dir, WEIGHTS_FILE)?;

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| BitextError::ModelLoad(format!("Failed to read config: {}", e)))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| BitextError::ModelLoad(format!("Failed to parse config: {}", e)))?;

        let mut tokenizer = HfTokenizer::from_file(&tokenizer_path)
            .map_err(|e| BitextError::ModelLoad(e.to_string()))?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| BitextError::ModelLoad(e.to_string()))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device) }
            .map_err(|e| BitextError::ModelLoad(e.to_string()))?;
        let model =
            BertModel::load(vb, &config).map_err(|e| BitextError::ModelLoad(e.to_string()))?;

        info!(dir = %dir.display(), hidden_size = config.hidden_size, "similarity model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
            embeddings: Mutex::new(HashMap::new()),
        })
    }

    /// Sentence embedding of `text`, computed once per distinct text.
    ///
    /// # Errors
    ///
    /// Returns `BitextError::Similarity` if tokenization or inference fails.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.cache().get(text) {
            return Ok(vector.clone());
        }

        let vector = self.encode(text).map_err(|e| BitextError::Similarity(e.to_string()))?;
        debug!(chars = text.chars().count(), dims = vector.len(), "text embedded");
        self.cache().insert(text.to_owned(), vector.clone());
        Ok(vector)
    }

    fn encode(&self, text: &str) -> std::result::Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        let encoding = self.tokenizer.encode(text, true)?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self.model.forward(&input_ids, &type_ids, Some(&mask))?;
        let pooled = mean_pool(&hidden, &mask)?;
        Ok(pooled.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Vec<f32>>> {
        self.embeddings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SimilarityModel for EmbeddingModel {
    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let (a, b) = (self.embed(a)?, self.embed(b)?);
        Ok(cosine(&a, &b))
    }
}

fn required(dir: &Path, file: &str) -> Result<PathBuf> {
    let path = dir.join(file);
    if path.is_file() {
        Ok(path)
    } else {
        Err(BitextError::ModelLoad(format!(
            "{} not found at {}",
            file,
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_fails_cleanly() {
        let err = EmbeddingModel::load("/nonexistent/bitext-model").err().unwrap();
        assert!(matches!(err, BitextError::ModelLoad(_)));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn missing_tokenizer_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();

        let err = EmbeddingModel::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains(TOKENIZER_FILE));
    }

    #[test]
    fn unparsable_config_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        for file in [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE] {
            std::fs::write(dir.path().join(file), "not json").unwrap();
        }

        let err = EmbeddingModel::load(dir.path()).err().unwrap();
        assert!(matches!(err, BitextError::ModelLoad(_)));
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
