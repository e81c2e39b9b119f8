// BART-style encoder/decoder summarizer on ONNX Runtime
use anyhow::{anyhow, Context, Result};
use ort::{
    inputs,
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Value,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokenizers::tokenizer::Tokenizer;
use tracing::{debug, info};

use super::generation::{GenerationParams, GreedySearch, SpecialTokens};
use super::{ModelError, SummarizationModel};

pub const ENCODER_FILE: &str = "encoder_model.onnx";
pub const DECODER_FILE: &str = "decoder_model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// Summarizer backed by an exported seq2seq checkpoint such as
/// `facebook/bart-large-cnn` (optimum layout, no past key values).
pub struct OnnxSummarizer {
    name: String,
    // Session::run needs &mut, the model itself is shared read-only
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
    special: SpecialTokens,
}

fn load_session(path: &Path, threads: usize) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(threads)?
        .commit_from_file(path)?;
    Ok(session)
}

fn require(dir: &Path, file: &str) -> Result<PathBuf> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(anyhow!("missing {}", path.display()));
    }
    Ok(path)
}

impl OnnxSummarizer {
    pub fn load(model_dir: &Path, threads: usize) -> Result<Self> {
        info!(model_dir = %model_dir.display(), "Loading summarization model");

        let encoder_path = require(model_dir, ENCODER_FILE)?;
        let decoder_path = require(model_dir, DECODER_FILE)?;
        let tokenizer_path = require(model_dir, TOKENIZER_FILE)?;

        let special = Self::read_special_tokens(&model_dir.join(CONFIG_FILE))?;
        debug!(?special, "Special tokens");

        let encoder = load_session(&encoder_path, threads)
            .with_context(|| format!("loading encoder {}", encoder_path.display()))?;
        let decoder = load_session(&decoder_path, threads)
            .with_context(|| format!("loading decoder {}", decoder_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("loading tokenizer {}: {}", tokenizer_path.display(), e))?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "onnx-summarizer".to_string());

        info!(model = %name, "Summarization model ready");

        Ok(Self {
            name,
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
            special,
        })
    }

    /// Defaults apply when the checkpoint ships without config.json
    fn read_special_tokens(path: &Path) -> Result<SpecialTokens> {
        if !path.exists() {
            return Ok(SpecialTokens::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let special: SpecialTokens = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        if special.max_position_embeddings < 2 {
            return Err(anyhow!(
                "{}: max_position_embeddings must be at least 2, got {}",
                path.display(),
                special.max_position_embeddings
            ));
        }
        Ok(special)
    }

    fn encode_input(&self, text: &str) -> Result<Vec<i64>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenizing input: {}", e))?;

        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let limit = self.special.max_position_embeddings;
        if ids.len() > limit {
            debug!(tokens = ids.len(), limit, "Truncating encoder input");
            ids.truncate(limit - 1);
            ids.push(self.special.eos_token_id as i64);
        }
        Ok(ids)
    }

    fn generate(&self, text: &str, params: &GenerationParams) -> Result<String> {
        let input_ids = self.encode_input(text)?;
        let input_len = input_ids.len();
        let attention_mask = vec![1_i64; input_len];

        let (hidden_shape, hidden_states) = {
            let mut encoder = self
                .encoder
                .lock()
                .map_err(|_| anyhow!("encoder session lock poisoned"))?;
            let outputs = encoder.run(inputs![
                "input_ids" => Value::from_array(([1_usize, input_len], input_ids.into_boxed_slice()))?,
                "attention_mask" => Value::from_array(([1_usize, input_len], attention_mask.clone().into_boxed_slice()))?
            ])?;
            let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
            (shape.clone(), data.to_vec())
        };

        let mut search = GreedySearch::new(*params, self.special);
        let mut decoder = self
            .decoder
            .lock()
            .map_err(|_| anyhow!("decoder session lock poisoned"))?;

        while !search.is_finished() {
            let decoder_ids: Vec<i64> = search.sequence().iter().map(|&t| t as i64).collect();
            let decoder_len = decoder_ids.len();

            let outputs = decoder.run(inputs![
                "input_ids" => Value::from_array(([1_usize, decoder_len], decoder_ids.into_boxed_slice()))?,
                "encoder_attention_mask" => Value::from_array(([1_usize, input_len], attention_mask.clone().into_boxed_slice()))?,
                "encoder_hidden_states" => Value::from_array((hidden_shape.clone(), hidden_states.clone().into_boxed_slice()))?
            ])?;

            // logits: [batch, decoder_len, vocab]; only the last position matters
            let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
            if shape.len() != 3 {
                return Err(anyhow!("unexpected decoder output rank {}", shape.len()));
            }
            let vocab = shape[2] as usize;
            let last_start = (shape[1] as usize - 1) * vocab;
            let mut logits = data[last_start..last_start + vocab].to_vec();

            search.step(&mut logits);
        }

        debug!(generated = search.output_tokens().len(), "Decoding complete");

        let summary = self
            .tokenizer
            .decode(search.output_tokens(), true)
            .map_err(|e| anyhow!("decoding output: {}", e))?;

        Ok(summary.trim().to_string())
    }
}

impl SummarizationModel for OnnxSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError> {
        self.generate(text, params).map_err(ModelError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_model_dir_fails_clearly() {
        let dir = tempdir().unwrap();
        let err = OnnxSummarizer::load(&dir.path().join("absent"), 1).err().unwrap();
        assert!(format!("{:#}", err).contains(ENCODER_FILE));
    }

    #[test]
    fn test_special_tokens_from_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"model_type": "bart", "eos_token_id": 2, "decoder_start_token_id": 2, "forced_bos_token_id": null, "max_position_embeddings": 512}"#,
        )
        .unwrap();

        let special = OnnxSummarizer::read_special_tokens(&path).unwrap();
        assert_eq!(special.forced_bos_token_id, None);
        assert_eq!(special.max_position_embeddings, 512);
        assert_eq!(special.bos_token_id, 0);
    }

    #[test]
    fn test_zero_position_limit_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"max_position_embeddings": 0}"#).unwrap();

        let err = OnnxSummarizer::read_special_tokens(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("max_position_embeddings"));
    }

    #[test]
    fn test_special_tokens_default_without_config() {
        let dir = tempdir().unwrap();
        let special = OnnxSummarizer::read_special_tokens(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(special, SpecialTokens::default());
    }
}
