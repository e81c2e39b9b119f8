use image::imageops;
use image::{Rgba, RgbaImage};
use rusttype::Font;

use super::canvas::Canvas;
use super::text::{draw_text, fit_text, line_height, text_image, text_width};
use crate::error::VisualizationError;

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 480;

const TITLE: &str = "Most Frequent Words";
const X_LABEL: &str = "Word";
const Y_LABEL: &str = "Frequency";

const MARGIN_LEFT: f32 = 70.0;
const MARGIN_RIGHT: f32 = 20.0;
const MARGIN_TOP: f32 = 50.0;
const MARGIN_BOTTOM: f32 = 130.0;

const TITLE_PX: f32 = 22.0;
const AXIS_LABEL_PX: f32 = 16.0;
const TICK_PX: f32 = 13.0;

const BAR_COLOR: Rgba<u8> = Rgba([31, 119, 180, 255]);
const AXIS_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID_COLOR: Rgba<u8> = Rgba([225, 225, 225, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([20, 20, 20, 255]);

/// Integer tick spacing giving at most `max_ticks` intervals up to `max_value`
pub fn tick_step(max_value: usize, max_ticks: usize) -> usize {
    let max_ticks = max_ticks.max(1);
    ((max_value + max_ticks - 1) / max_ticks).max(1)
}

/// Renders `words` (already ranked) as a vertical bar chart.
pub fn render_bar_chart(
    words: &[(&str, usize)],
    font: &Font<'_>,
) -> Result<RgbaImage, VisualizationError> {
    let max_count = words.iter().map(|(_, n)| *n).max().ok_or(VisualizationError::NoTokens)?;

    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT)?;
    let plot_left = MARGIN_LEFT;
    let plot_right = CHART_WIDTH as f32 - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = CHART_HEIGHT as f32 - MARGIN_BOTTOM;
    let plot_width = plot_right - plot_left;
    let plot_height = plot_bottom - plot_top;

    let step = tick_step(max_count, 8);
    let axis_max = ((max_count + step - 1) / step) * step;
    let y_for = |value: usize| plot_bottom - plot_height * value as f32 / axis_max as f32;

    let ticks: Vec<usize> = (0..=axis_max).step_by(step).collect();
    for &tick in &ticks {
        let y = y_for(tick);
        canvas.line((plot_left, y), (plot_right, y), 1.0, GRID_COLOR);
        canvas.line((plot_left - 5.0, y), (plot_left, y), 1.0, AXIS_COLOR);
    }

    let slot = plot_width / words.len() as f32;
    let bar_width = slot * 0.8;
    for (i, (_, count)) in words.iter().enumerate() {
        let x = plot_left + slot * i as f32 + (slot - bar_width) / 2.0;
        let top = y_for(*count);
        canvas.fill_rect(x, top, bar_width, plot_bottom - top, BAR_COLOR);
    }

    canvas.line((plot_left, plot_top), (plot_left, plot_bottom), 1.5, AXIS_COLOR);
    canvas.line((plot_left, plot_bottom), (plot_right, plot_bottom), 1.5, AXIS_COLOR);

    let mut image = canvas.into_image();

    // Title and axis captions
    let title_x = (CHART_WIDTH as f32 - text_width(font, TITLE_PX, TITLE)) / 2.0;
    draw_text(&mut image, font, TITLE_PX, title_x, 12.0, TITLE, TEXT_COLOR);

    let x_label_x = plot_left + (plot_width - text_width(font, AXIS_LABEL_PX, X_LABEL)) / 2.0;
    let x_label_top = CHART_HEIGHT as f32 - line_height(font, AXIS_LABEL_PX) - 8.0;
    draw_text(&mut image, font, AXIS_LABEL_PX, x_label_x, x_label_top, X_LABEL, TEXT_COLOR);

    let y_label = imageops::rotate270(&text_image(font, AXIS_LABEL_PX, Y_LABEL, TEXT_COLOR));
    let y_label_top = plot_top + (plot_height - y_label.height() as f32) / 2.0;
    imageops::overlay(&mut image, &y_label, 6, y_label_top as i64);

    for &tick in &ticks {
        let label = tick.to_string();
        let x = plot_left - 8.0 - text_width(font, TICK_PX, &label);
        let y = y_for(tick) - line_height(font, TICK_PX) / 2.0;
        draw_text(&mut image, font, TICK_PX, x, y, &label, TEXT_COLOR);
    }

    // Word labels read bottom-to-top under each bar
    let label_room = MARGIN_BOTTOM - line_height(font, AXIS_LABEL_PX) - 24.0;
    for (i, (word, _)) in words.iter().enumerate() {
        let fitted = fit_text(font, TICK_PX, word, label_room);
        if fitted.is_empty() {
            continue;
        }
        let label = imageops::rotate270(&text_image(font, TICK_PX, &fitted, TEXT_COLOR));
        let center = plot_left + slot * (i as f32 + 0.5);
        let x = center - label.width() as f32 / 2.0;
        imageops::overlay(&mut image, &label, x as i64, (plot_bottom + 6.0) as i64);
    }

    Ok(image)
}
