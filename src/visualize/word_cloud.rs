use image::{Rgba, RgbaImage};
use rusttype::Font;
use tracing::debug;

use super::text::{draw_text, line_height, text_width};
use crate::error::VisualizationError;
use crate::frequency::WordFrequencyTable;

pub const CLOUD_WIDTH: u32 = 800;
pub const CLOUD_HEIGHT: u32 = 400;

const MAX_WORDS: usize = 200;
const MIN_FONT_PX: f32 = 10.0;
const FONT_STEP_PX: f32 = 2.0;
/// Weight of relative frequency versus rank when sizing words
const RELATIVE_SCALING: f32 = 0.5;
const PADDING: u32 = 2;
/// Occupancy grid resolution in pixels
const CELL: u32 = 4;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PALETTE: [Rgba<u8>; 8] = [
    Rgba([68, 1, 84, 255]),
    Rgba([72, 40, 120, 255]),
    Rgba([62, 74, 137, 255]),
    Rgba([49, 104, 142, 255]),
    Rgba([38, 130, 142, 255]),
    Rgba([31, 158, 137, 255]),
    Rgba([53, 183, 121, 255]),
    Rgba([109, 205, 89, 255]),
];

/// A word drawn into the cloud
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_px: f32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Coarse occupancy grid with a summed-area table for O(1) box queries
struct Occupancy {
    cols: usize,
    rows: usize,
    filled: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cols = ((width + CELL - 1) / CELL) as usize;
        let rows = ((height + CELL - 1) / CELL) as usize;
        Self {
            cols,
            rows,
            filled: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn cell_span(x: u32, y: u32, width: u32, height: u32) -> (usize, usize, usize, usize) {
        let c0 = (x / CELL) as usize;
        let r0 = (y / CELL) as usize;
        let c1 = ((x + width + CELL - 1) / CELL) as usize;
        let r1 = ((y + height + CELL - 1) / CELL) as usize;
        (c0, r0, c1, r1)
    }

    fn is_free(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        let (c0, r0, c1, r1) = Self::cell_span(x, y, width, height);
        if c1 > self.cols || r1 > self.rows {
            return false;
        }
        let stride = self.cols + 1;
        let at = |r: usize, c: usize| self.integral[r * stride + c];
        at(r1, c1) + at(r0, c0) == at(r0, c1) + at(r1, c0)
    }

    fn mark(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let (c0, r0, c1, r1) = Self::cell_span(x, y, width, height);
        for r in r0..r1.min(self.rows) {
            for c in c0..c1.min(self.cols) {
                self.filled[r * self.cols + c] = true;
            }
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let stride = self.cols + 1;
        for r in 0..self.rows {
            let mut row_sum = 0;
            for c in 0..self.cols {
                row_sum += self.filled[r * self.cols + c] as u32;
                self.integral[(r + 1) * stride + c + 1] = self.integral[r * stride + c + 1] + row_sum;
            }
        }
    }
}

/// First free top-left position along an Archimedean spiral from the centre
fn spiral_search(occupancy: &Occupancy, width: u32, height: u32, canvas: (u32, u32)) -> Option<(u32, u32)> {
    let (canvas_w, canvas_h) = canvas;
    if width > canvas_w || height > canvas_h {
        return None;
    }
    let cx = (canvas_w - width) as f32 / 2.0;
    let cy = (canvas_h - height) as f32 / 2.0;
    let aspect = canvas_w as f32 / canvas_h as f32;
    let max_radius = (cx * cx + cy * cy).sqrt() + 1.0;

    let mut t = 0.0_f32;
    loop {
        let radius = 1.5 * t;
        if radius / aspect.max(1.0) > max_radius {
            return None;
        }
        let x = cx + radius * t.cos() * aspect;
        let y = cy + radius * t.sin();
        if x >= 0.0 && y >= 0.0 {
            let (x, y) = (x as u32, y as u32);
            if x + width <= canvas_w && y + height <= canvas_h && occupancy.is_free(x, y, width, height) {
                return Some((x, y));
            }
        }
        t += 0.1;
    }
}

/// Lays out up to 200 of the most frequent words, biggest first.
///
/// A word's starting size mixes its frequency relative to the previous word
/// with the previous word's size; when it does not fit anywhere the size is
/// stepped down until it fits or drops below the minimum, in which case the
/// word is skipped. Layout is deterministic.
pub fn layout_words(table: &WordFrequencyTable, font: &Font<'_>, width: u32, height: u32) -> Vec<PlacedWord> {
    let words = table.top_n(MAX_WORDS);
    let Some(&(_, max_count)) = words.first() else {
        return Vec::new();
    };

    let mut occupancy = Occupancy::new(width, height);
    let mut placed = Vec::new();
    let mut font_px = height as f32 * 0.45;
    let mut last_count = max_count;

    for (word, count) in words {
        if count != last_count {
            let ratio = count as f32 / last_count as f32;
            font_px = (RELATIVE_SCALING * ratio + (1.0 - RELATIVE_SCALING)) * font_px;
        }

        let mut position = None;
        while font_px >= MIN_FONT_PX {
            let box_w = text_width(font, font_px, word).ceil() as u32 + 2 * PADDING;
            let box_h = line_height(font, font_px).ceil() as u32 + 2 * PADDING;
            if let Some((x, y)) = spiral_search(&occupancy, box_w, box_h, (width, height)) {
                position = Some((x, y, box_w, box_h));
                break;
            }
            font_px -= FONT_STEP_PX;
        }

        match position {
            Some((x, y, box_w, box_h)) => {
                occupancy.mark(x, y, box_w, box_h);
                placed.push(PlacedWord {
                    word: word.to_string(),
                    count,
                    font_px,
                    x,
                    y,
                    width: box_w,
                    height: box_h,
                });
                last_count = count;
            }
            None => {
                // Canvas is full at the minimum size; nothing smaller will fit
                debug!(word, "Word cloud full");
                break;
            }
        }
    }

    placed
}

/// Renders the summary's word cloud at 800x400.
pub fn render_word_cloud(table: &WordFrequencyTable, font: &Font<'_>) -> Result<(RgbaImage, Vec<PlacedWord>), VisualizationError> {
    if table.is_empty() {
        return Err(VisualizationError::NoTokens);
    }

    let placed = layout_words(table, font, CLOUD_WIDTH, CLOUD_HEIGHT);
    if placed.is_empty() {
        return Err(VisualizationError::render("no word fits on the word cloud canvas"));
    }

    let mut image = RgbaImage::from_pixel(CLOUD_WIDTH, CLOUD_HEIGHT, BACKGROUND);
    for (rank, word) in placed.iter().enumerate() {
        let color = PALETTE[rank % PALETTE.len()];
        draw_text(
            &mut image,
            font,
            word.font_px,
            (word.x + PADDING) as f32,
            (word.y + PADDING) as f32,
            &word.word,
            color,
        );
    }

    debug!(placed = placed.len(), distinct = table.len(), "Rendered word cloud");
    Ok((image, placed))
}
