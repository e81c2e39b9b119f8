use rusttype::Font;
use std::sync::Arc;
use tracing::info;

use crate::config::{PipelineConfig, ResourceConfig};
use crate::error::StartupError;
use crate::logging::PerformanceTimer;
use crate::model::{OnnxSummarizer, SummarizationModel};
use crate::stopwords::Stopwords;
use crate::visualize::load_font;

/// Process-wide read-only state, loaded once before the window opens
pub struct Resources {
    pub model: Arc<dyn SummarizationModel>,
    pub stopwords: Stopwords,
    pub font: Font<'static>,
}

impl Resources {
    pub fn new(model: Arc<dyn SummarizationModel>, stopwords: Stopwords, font: Font<'static>) -> Self {
        Self { model, stopwords, font }
    }

    /// Loads the stopwords, the chart font and the summarization model.
    /// Any failure aborts startup.
    pub fn load(config: &ResourceConfig, pipeline: &PipelineConfig) -> Result<Self, StartupError> {
        let _timer = PerformanceTimer::start("resource loading");

        let stopwords = match &config.stopwords_path {
            Some(path) => Stopwords::from_file(path)?,
            None => Stopwords::english(),
        };
        info!(count = stopwords.len(), "Stopwords loaded");

        let font = load_font(config.font_path.as_deref())?;

        let model = OnnxSummarizer::load(&config.model_dir, pipeline.model_threads)
            .map_err(|e| StartupError::Model {
                path: config.model_dir.display().to_string(),
                message: format!("{:#}", e),
            })?;

        Ok(Self::new(Arc::new(model), stopwords, font))
    }
}
