//! Immediate-mode text overlay: lays out bitmap-font text as coloured quads.
//!
//! Coordinates are in framebuffer pixels from the top-left corner; emitted
//! vertices are already in normalized device coordinates.

use bytemuck::{Pod, Zeroable};

use crate::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, LINE_HEIGHT};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Screen pixels per font pixel.
    pub scale: f32,
    pub color: [f32; 4],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: 2.0,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Size in pixels of `text` (multi-line aware) at `scale`.
pub fn measure_text(text: &str, scale: f32) -> (f32, f32) {
    let lines: Vec<&str> = text.lines().collect();
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rows = lines.len().max(1) as f32;
    let width = if widest == 0 {
        0.0
    } else {
        (widest as u32 * GLYPH_ADVANCE - 1) as f32 * scale
    };
    let height = ((rows - 1.0) * LINE_HEIGHT as f32 + GLYPH_HEIGHT as f32) * scale;
    (width, height)
}

/// Lay out `lines` starting at `origin` (pixels) into a fresh vertex list.
pub fn layout_text(
    lines: &[&str],
    origin: [f32; 2],
    style: TextStyle,
    viewport: [u32; 2],
) -> Vec<OverlayVertex> {
    let mut batch = OverlayBatch::new();
    batch.begin(viewport[0], viewport[1]);
    batch.text(origin[0], origin[1], &lines.join("\n"), style);
    batch.vertices
}

/// Per-frame vertex batch, rebuilt every frame.
#[derive(Debug, Default)]
pub struct OverlayBatch {
    vertices: Vec<OverlayVertex>,
    viewport: [f32; 2],
}

impl OverlayBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame for a `width` x `height` framebuffer.
    pub fn begin(&mut self, width: u32, height: u32) {
        self.vertices.clear();
        self.viewport = [width.max(1) as f32, height.max(1) as f32];
    }

    /// Solid rectangle, e.g. a backdrop behind text.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        let [vw, vh] = self.viewport;
        let to_ndc = |px: f32, py: f32| [px / vw * 2.0 - 1.0, 1.0 - py / vh * 2.0];
        let (x0, y0, x1, y1) = (x, y, x + w, y + h);
        for pos in [
            to_ndc(x0, y0),
            to_ndc(x0, y1),
            to_ndc(x1, y1),
            to_ndc(x0, y0),
            to_ndc(x1, y1),
            to_ndc(x1, y0),
        ] {
            self.vertices.push(OverlayVertex { pos, color });
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`). `\n` starts a new line.
    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        let s = style.scale;
        for (row, line) in text.lines().enumerate() {
            let line_y = y + (row as u32 * LINE_HEIGHT) as f32 * s;
            for (col, c) in line.chars().enumerate() {
                let Some(glyph) = font::glyph(c) else {
                    continue;
                };
                let glyph_x = x + (col as u32 * GLYPH_ADVANCE) as f32 * s;
                for (px, py) in font::lit_pixels(glyph) {
                    self.rect(
                        glyph_x + px as f32 * s,
                        line_y + py as f32 * s,
                        s,
                        s,
                        style.color,
                    );
                }
            }
        }
    }

    /// Text block on a translucent backdrop with `pad` pixels of margin.
    pub fn panel(&mut self, x: f32, y: f32, lines: &[String], style: TextStyle, pad: f32) {
        if lines.is_empty() {
            return;
        }
        let block = lines.join("\n");
        let (w, h) = measure_text(&block, style.scale);
        self.rect(x, y, w + 2.0 * pad, h + 2.0 * pad, [0.0, 0.0, 0.0, 0.45]);
        self.text(x + pad, y + pad, &block, style);
    }

    pub fn vertices(&self) -> &[OverlayVertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_maps_pixels_to_ndc() {
        let mut batch = OverlayBatch::new();
        batch.begin(200, 100);
        batch.rect(0.0, 0.0, 200.0, 100.0, [1.0; 4]);
        let v = batch.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].pos, [-1.0, 1.0]);
        assert_eq!(v[2].pos, [1.0, -1.0]);
    }

    #[test]
    fn one_quad_per_lit_pixel() {
        let mut batch = OverlayBatch::new();
        batch.begin(640, 480);
        batch.text(10.0, 10.0, "I I", TextStyle::default());
        // 'I' has 11 lit pixels; the space emits nothing.
        assert_eq!(batch.vertices().len(), 2 * 11 * 6);
    }

    #[test]
    fn second_glyph_is_advanced() {
        let mut batch = OverlayBatch::new();
        batch.begin(100, 100);
        let style = TextStyle {
            scale: 1.0,
            ..Default::default()
        };
        batch.text(0.0, 0.0, "-", style);
        let first = batch.vertices()[0].pos[0];
        batch.begin(100, 100);
        batch.text(0.0, 0.0, " -", style);
        let second = batch.vertices()[0].pos[0];
        let advance_ndc = GLYPH_ADVANCE as f32 / 100.0 * 2.0;
        assert!((second - first - advance_ndc).abs() < 1e-6);
    }

    #[test]
    fn batch_grows_past_any_fixed_size() {
        let mut batch = OverlayBatch::new();
        batch.begin(1920, 1080);
        let long = "W".repeat(500);
        batch.text(0.0, 0.0, &long, TextStyle::default());
        let w_pixels = font::lit_pixels(font::glyph('W').expect("W")).count();
        assert_eq!(batch.vertices().len(), 500 * w_pixels * 6);
    }

    #[test]
    fn measure_handles_multiple_lines() {
        assert_eq!(measure_text("AB", 1.0), (11.0, 7.0));
        assert_eq!(measure_text("A\nABC", 2.0), (34.0, 32.0));
        assert_eq!(measure_text("", 1.0), (0.0, 7.0));
    }

    #[test]
    fn layout_text_stacks_lines() {
        let style = TextStyle {
            scale: 1.0,
            ..Default::default()
        };
        let verts = layout_text(&["-", "-"], [0.0, 0.0], style, [100, 100]);
        // '-' is five pixels wide in a single row.
        assert_eq!(verts.len(), 2 * 5 * 6);
        let row_step = verts[5 * 6].pos[1] - verts[0].pos[1];
        assert!((row_step + LINE_HEIGHT as f32 / 100.0 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn begin_clears_previous_frame() {
        let mut batch = OverlayBatch::new();
        batch.begin(10, 10);
        batch.panel(0.0, 0.0, &["FPS: 60".to_string()], TextStyle::default(), 4.0);
        assert!(!batch.is_empty());
        batch.begin(10, 10);
        assert!(batch.is_empty());
    }
}
