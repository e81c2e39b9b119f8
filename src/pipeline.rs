use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::PipelineResult;
use crate::extractor::extract_text;
use crate::logging::PerformanceTimer;
use crate::resources::Resources;
use crate::summarizer::{ChunkedSummarizer, Summary};
use crate::visualize::{visualize_summary, VisualizationPair};

/// Everything one successful run hands back to the UI
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub summary: Summary,
    pub visuals: VisualizationPair,
    pub source_chars: usize,
}

/// extract → summarize → visualize, strictly in that order
pub struct Pipeline {
    resources: Arc<Resources>,
    summarizer: ChunkedSummarizer,
}

impl Pipeline {
    pub fn new(resources: Arc<Resources>) -> Self {
        let summarizer = ChunkedSummarizer::new(Arc::clone(&resources.model));
        Self { resources, summarizer }
    }

    /// Uses a custom chunk size instead of the default
    pub fn with_summarizer(resources: Arc<Resources>, summarizer: ChunkedSummarizer) -> Self {
        Self { resources, summarizer }
    }

    pub fn run(&self, path: &Path) -> PipelineResult<PipelineOutput> {
        let timer = PerformanceTimer::start(format!("pipeline {}", path.display()));

        let text = extract_text(path)?;
        let source_chars = text.chars().count();
        timer.checkpoint("extraction");

        let summary = self.summarizer.summarize(&text)?;
        timer.checkpoint("summarization");

        let visuals = visualize_summary(&summary.text, &self.resources.stopwords, &self.resources.font)?;
        timer.checkpoint("visualization");

        info!(
            source_chars,
            chunks = summary.chunk_count,
            summary_chars = summary.text.chars().count(),
            elapsed_ms = timer.elapsed_ms() as u64,
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            summary,
            visuals,
            source_chars,
        })
    }
}
