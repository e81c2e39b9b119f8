//! Summary visualizations: top-word bar chart and word cloud.

pub mod bar_chart;
pub mod canvas;
pub mod font;
pub mod text;
pub mod word_cloud;

use image::RgbaImage;
use rusttype::Font;
use tracing::info;

use crate::error::VisualizationError;
use crate::frequency::{WordFrequencyTable, TOP_WORDS};
use crate::stopwords::Stopwords;

pub use font::load_font;

/// The two images produced for one summary
#[derive(Debug, Clone)]
pub struct VisualizationPair {
    pub bar_chart: RgbaImage,
    pub word_cloud: RgbaImage,
    /// Words shown in the bar chart, highest count first
    pub top_words: Vec<(String, usize)>,
}

/// Builds the word-frequency table for `summary` and renders both images.
///
/// Fails with [`VisualizationError::NoTokens`] when nothing survives
/// stopword and length filtering.
pub fn visualize_summary(
    summary: &str,
    stopwords: &Stopwords,
    font: &Font<'_>,
) -> Result<VisualizationPair, VisualizationError> {
    let table = WordFrequencyTable::from_summary(summary, stopwords);
    if table.is_empty() {
        return Err(VisualizationError::NoTokens);
    }
    info!(distinct = table.len(), total = table.total(), "Built word frequency table");

    let top = table.top_n(TOP_WORDS);
    let bar_chart = bar_chart::render_bar_chart(&top, font)?;
    let (word_cloud, _) = word_cloud::render_word_cloud(&table, font)?;

    Ok(VisualizationPair {
        bar_chart,
        word_cloud,
        top_words: top.into_iter().map(|(w, n)| (w.to_string(), n)).collect(),
    })
}
