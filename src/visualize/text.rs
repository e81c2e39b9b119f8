use image::{Rgba, RgbaImage};
use rusttype::{point, Font, PositionedGlyph, Scale};

/// Horizontal advance of `text` at `px` pixels
pub fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    let scale = Scale::uniform(px);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Ascent to descent distance at `px` pixels
pub fn line_height(font: &Font<'_>, px: f32) -> f32 {
    let metrics = font.v_metrics(Scale::uniform(px));
    metrics.ascent - metrics.descent
}

fn layout<'font>(font: &Font<'font>, px: f32, x: f32, top: f32, text: &str) -> Vec<PositionedGlyph<'font>> {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    font.layout(text, scale, point(x, top + ascent)).collect()
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * (color[3] as f32 / 255.0);
    for c in 0..3 {
        let mixed = pixel[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
        pixel[c] = mixed.round() as u8;
    }
    let out_alpha = pixel[3] as f32 / 255.0 + alpha * (1.0 - pixel[3] as f32 / 255.0);
    pixel[3] = (out_alpha * 255.0).round() as u8;
}

/// Draws `text` with its top-left corner at (`x`, `top`), clipped to the image.
pub fn draw_text(
    image: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    x: f32,
    top: f32,
    text: &str,
    color: Rgba<u8>,
) {
    let (width, height) = image.dimensions();
    for glyph in layout(font, px, x, top, text) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let ix = bb.min.x + gx as i32;
            let iy = bb.min.y + gy as i32;
            if ix >= 0 && iy >= 0 && (ix as u32) < width && (iy as u32) < height {
                blend(image.get_pixel_mut(ix as u32, iy as u32), color, coverage);
            }
        });
    }
}

/// Renders `text` onto a transparent image just large enough to hold it
pub fn text_image(font: &Font<'_>, px: f32, text: &str, color: Rgba<u8>) -> RgbaImage {
    let width = text_width(font, px, text).ceil().max(1.0) as u32;
    let height = line_height(font, px).ceil().max(1.0) as u32;
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    draw_text(&mut image, font, px, 0.0, 0.0, text, color);
    image
}

/// Shortens `text` with a trailing ".." until it fits in `max_width`
pub fn fit_text(font: &Font<'_>, px: f32, text: &str, max_width: f32) -> String {
    if text_width(font, px, text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "..";
        if text_width(font, px, &candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(all(test, feature = "gui"))]
mod tests {
    use super::*;
    use crate::visualize::font::load_font;

    #[test]
    fn test_width_grows_with_text() {
        let font = load_font(None).unwrap();
        let short = text_width(&font, 20.0, "ab");
        let long = text_width(&font, 20.0, "abcdef");
        assert!(short > 0.0);
        assert!(long > short);
        assert!(text_width(&font, 40.0, "ab") > short);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let font = load_font(None).unwrap();
        let image = text_image(&font, 24.0, "Word", Rgba([0, 0, 0, 255]));
        assert!(image.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_fit_text_truncates() {
        let font = load_font(None).unwrap();
        let max = text_width(&font, 14.0, "internationalization") / 2.0;
        let fitted = fit_text(&font, 14.0, "internationalization", max);
        assert!(fitted.ends_with(".."));
        assert!(text_width(&font, 14.0, &fitted) <= max);
    }
}
