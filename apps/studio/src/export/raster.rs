//! Rasterizes a laid-out surface into a single RGB bitmap at a fixed oversampling factor.

use ab_glyph::{point, Font, GlyphId, PxScale, ScaleFont};
use image::{Rgb as Pixel, RgbImage};

use crate::export::fonts::FontFaces;
use crate::export::CaptureError;
use crate::layout::{Paint, Surface, TextRun};
use crate::models::style::Rgb;

/// Ceiling on bitmap height. A surface this tall is a runaway layout, not a résumé.
pub const MAX_RASTER_HEIGHT_PX: u32 = 60_000;

/// Smallest oversampling factor that still prints sharply.
pub const MIN_RASTER_SCALE: f32 = 2.0;

pub fn rasterize(surface: &Surface, faces: &FontFaces, scale: f32) -> Result<RgbImage, CaptureError> {
    let scale = scale.max(MIN_RASTER_SCALE);
    let width = (surface.width * scale).ceil() as u32;
    let height = (surface.height * scale).ceil() as u32;
    if width == 0 || height == 0 || height > MAX_RASTER_HEIGHT_PX {
        return Err(CaptureError::TooLarge { width, height });
    }

    let mut canvas = Canvas {
        image: RgbImage::from_pixel(width, height, Pixel([0xff, 0xff, 0xff])),
        scale,
    };
    for paint in &surface.paints {
        match paint {
            Paint::Rect {
                x,
                y,
                width,
                height,
                color,
            } => canvas.fill_rect(*x, *y, *width, *height, *color, 1.0),
            Paint::Text(run) => canvas.text(run, faces),
        }
    }
    Ok(canvas.image)
}

struct Canvas {
    image: RgbImage,
    scale: f32,
}

impl Canvas {
    /// Fills a rectangle given in surface px.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let s = self.scale;
        let x0 = (x * s).round().max(0.0) as u32;
        let y0 = (y * s).round().max(0.0) as u32;
        let x1 = (((x + w) * s).round().max(0.0) as u32).min(self.image.width());
        let y1 = (((y + h) * s).round().max(0.0) as u32).min(self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgb, coverage: f32) {
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let a = coverage.clamp(0.0, 1.0);
        let Pixel([r, g, b]) = *self.image.get_pixel(x, y);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        self.image
            .put_pixel(x, y, Pixel([mix(color.0, r), mix(color.1, g), mix(color.2, b)]));
    }

    fn text(&mut self, run: &TextRun, faces: &FontFaces) {
        match faces.face(run.bold) {
            Some(font) => self.glyphs(run, font),
            None => self.placeholder_blocks(run),
        }
    }

    fn glyphs<F: Font>(&mut self, run: &TextRun, font: &F) {
        let px = run.size * self.scale;
        let scaled = font.as_scaled(PxScale::from(px));
        // Centre the em box inside the line box, as a browser does.
        let top = (run.y + (run.line_height - run.size) / 2.0) * self.scale;
        let baseline = top + scaled.ascent();

        let mut caret = run.x * self.scale;
        let mut previous: Option<GlyphId> = None;
        for ch in run.text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x + gx as f32;
                let y = bounds.min.y + gy as f32;
                if x >= 0.0 && y >= 0.0 {
                    self.blend(x as u32, y as u32, run.color, coverage);
                }
            });
        }
    }

    /// Fallback when no face is available: one translucent block per visible character.
    fn placeholder_blocks(&mut self, run: &TextRun) {
        let advance = run.size * 0.55;
        let top = run.y + (run.line_height - run.size * 0.7) / 2.0;
        for (i, ch) in run.text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = run.x + i as f32 * advance;
            self.fill_rect(x, top, advance * 0.8, run.size * 0.7, run.color, 0.35);
        }
    }
}
