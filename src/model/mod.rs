//! Abstractive summarization model seam.
//!
//! The pipeline only talks to [`SummarizationModel`]; the ONNX-backed BART
//! implementation lives in [`onnx`] and tests plug in deterministic fakes.

pub mod generation;
pub mod onnx;

use thiserror::Error;

pub use generation::{GenerationParams, GreedySearch, SpecialTokens};
pub use onnx::OnnxSummarizer;

#[derive(Error, Debug)]
#[error("{message}")]
pub struct ModelError {
    pub message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ModelError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain on one line
        Self::new(format!("{:#}", err))
    }
}

/// A pretrained text-to-text summarizer.
///
/// Implementations are loaded once at startup and shared read-only across
/// runs, so `summarize` takes `&self`.
pub trait SummarizationModel: Send + Sync {
    fn name(&self) -> &str;

    fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError>;
}
