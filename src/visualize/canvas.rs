use image::{Rgba, RgbaImage};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::VisualizationError;

/// Vector drawing surface for chart geometry (bars, axes, grid lines)
pub struct Canvas {
    pixmap: Pixmap,
}

fn paint(color: Rgba<u8>) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    paint
}

impl Canvas {
    /// White canvas of the given size
    pub fn new(width: u32, height: u32) -> Result<Self, VisualizationError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            VisualizationError::render(format!("cannot allocate {}x{} canvas", width, height))
        })?;
        pixmap.fill(Color::WHITE);
        Ok(Self { pixmap })
    }

    /// Zero-sized rectangles are silently skipped
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba<u8>) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Converts the premultiplied pixmap into a straight-alpha RGBA image
    pub fn into_image(self) -> RgbaImage {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let mut image = RgbaImage::new(width, height);
        for (pixel, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_white() {
        let image = Canvas::new(4, 3).unwrap().into_image();
        assert_eq!(image.dimensions(), (4, 3));
        assert!(image.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_fill_rect_paints_inside_only() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.fill_rect(2.0, 2.0, 4.0, 4.0, Rgba([255, 0, 0, 255]));
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(3, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(8, 8), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_size_canvas_is_error() {
        assert!(Canvas::new(0, 10).is_err());
    }
}
