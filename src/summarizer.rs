use std::sync::Arc;
use tracing::info;

use crate::chunker::{split_into_chunks, MAX_CHUNK_CHARS};
use crate::error::SummarizationError;
use crate::log_chunk_summarized;
use crate::model::{GenerationParams, SummarizationModel};

/// Concatenated per-chunk summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub chunk_count: usize,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Summarizes long text chunk by chunk with a single model.
///
/// Each chunk is summarized independently and the pieces are joined with one
/// space, in chunk order. The joined result is not summarized again.
pub struct ChunkedSummarizer {
    model: Arc<dyn SummarizationModel>,
    max_chunk_chars: usize,
    params: GenerationParams,
}

impl ChunkedSummarizer {
    pub fn new(model: Arc<dyn SummarizationModel>) -> Self {
        Self {
            model,
            max_chunk_chars: MAX_CHUNK_CHARS,
            params: GenerationParams::SUMMARY,
        }
    }

    pub fn with_chunk_size(
        model: Arc<dyn SummarizationModel>,
        max_chunk_chars: usize,
    ) -> Result<Self, SummarizationError> {
        if max_chunk_chars == 0 {
            return Err(SummarizationError::InvalidChunkSize(max_chunk_chars));
        }
        Ok(Self {
            model,
            max_chunk_chars,
            params: GenerationParams::SUMMARY,
        })
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    /// Stops at the first chunk the model fails on; no partial summary is returned.
    pub fn summarize(&self, text: &str) -> Result<Summary, SummarizationError> {
        let chunks = split_into_chunks(text, self.max_chunk_chars);
        let total = chunks.len();
        info!(chunks = total, model = self.model.name(), "Summarizing text");

        let mut pieces = Vec::with_capacity(total);
        for chunk in &chunks {
            let piece = self
                .model
                .summarize(chunk.text, &self.params)
                .map_err(|e| SummarizationError::Model {
                    chunk: chunk.index + 1,
                    total,
                    message: e.message,
                })?;
            log_chunk_summarized!(chunk.index + 1, total, chunk.char_count(), piece.chars().count());
            pieces.push(piece);
        }

        Ok(Summary {
            text: pieces.join(" "),
            chunk_count: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use std::sync::Mutex;

    /// Records every call and answers with the chunk's length
    struct RecordingModel {
        calls: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl RecordingModel {
        fn new() -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_on_call: None }
        }

        fn failing_on(call: usize) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_on_call: Some(call) }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl SummarizationModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError> {
            assert_eq!(*params, GenerationParams::SUMMARY);
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            if Some(calls.len()) == self.fail_on_call {
                return Err(ModelError::new("out of memory"));
            }
            Ok(format!("summary-{}-{}", calls.len(), text.chars().count()))
        }
    }

    #[test]
    fn test_three_chunks_three_calls() {
        let model = Arc::new(RecordingModel::new());
        let summarizer = ChunkedSummarizer::new(model.clone());

        let text = "a".repeat(2500);
        let summary = summarizer.summarize(&text).unwrap();

        assert_eq!(model.call_count(), 3);
        assert_eq!(summary.chunk_count, 3);
        assert_eq!(summary.text, "summary-1-1000 summary-2-1000 summary-3-500");
    }

    #[test]
    fn test_empty_text_never_calls_model() {
        let model = Arc::new(RecordingModel::new());
        let summarizer = ChunkedSummarizer::new(model.clone());

        let summary = summarizer.summarize("").unwrap();

        assert_eq!(model.call_count(), 0);
        assert!(summary.is_empty());
        assert_eq!(summary.chunk_count, 0);
    }

    #[test]
    fn test_chunks_passed_in_order() {
        let model = Arc::new(RecordingModel::new());
        let summarizer = ChunkedSummarizer::with_chunk_size(model.clone(), 4).unwrap();

        summarizer.summarize("abcdefghij").unwrap();

        let calls = model.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_fail_fast_on_first_error() {
        let model = Arc::new(RecordingModel::failing_on(2));
        let summarizer = ChunkedSummarizer::new(model.clone());

        let err = summarizer.summarize(&"b".repeat(4000)).unwrap_err();

        assert_eq!(model.call_count(), 2);
        match err {
            SummarizationError::Model { chunk, total, message } => {
                assert_eq!(chunk, 2);
                assert_eq!(total, 4);
                assert_eq!(message, "out of memory");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let model = Arc::new(RecordingModel::new());
        assert!(matches!(
            ChunkedSummarizer::with_chunk_size(model, 0),
            Err(SummarizationError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_deterministic_model_gives_identical_summaries() {
        let model = Arc::new(RecordingModel::new());
        let first = ChunkedSummarizer::new(model).summarize(&"c".repeat(1500)).unwrap();

        let model = Arc::new(RecordingModel::new());
        let second = ChunkedSummarizer::new(model).summarize(&"c".repeat(1500)).unwrap();

        assert_eq!(first, second);
    }
}
