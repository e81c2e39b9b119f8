//! Summarize a PDF with a local abstractive model and chart the summary's
//! most frequent words.

pub mod chunker;
pub mod config;
pub mod controller;
pub mod error;
pub mod extractor;
pub mod frequency;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod resources;
pub mod stopwords;
pub mod summarizer;
pub mod visualize;

#[cfg(feature = "gui")]
pub mod app;

pub use error::{ExtractionError, PipelineError, PipelineResult, StartupError, SummarizationError, VisualizationError};
pub use pipeline::{Pipeline, PipelineOutput};
