//! 2D overlay canvas drawn over the slice panes.
//!
//! Region box outlines and brush marks are rasterized on the CPU into an
//! RGBA image with a top-left origin; the host composites it over the GL
//! slice canvas.

use image::{Rgba, RgbaImage};
use sharevol_core::Colour;

/// CPU overlay canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCanvas {
    image: RgbaImage,
}

impl OverlayCanvas {
    /// Creates a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Resizes and clears the canvas.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.image.width() != width || self.image.height() != height {
            self.image = RgbaImage::new(width, height);
        } else {
            self.clear();
        }
    }

    /// Makes every pixel transparent.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// The rasterized overlay.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel at (`x`, `y`), if inside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Colour> {
        if x < self.width() && y < self.height() {
            let p = self.image.get_pixel(x, y).0;
            Some(Colour::rgba(p[0], p[1], p[2], p[3]))
        } else {
            None
        }
    }

    /// Number of non-transparent pixels.
    pub fn painted(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    /// Fills an axis-aligned rectangle, clipped to the canvas.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
        let (x0, x1) = span(x, w, self.width());
        let (y0, y1) = span(y, h, self.height());
        let rgba = Rgba([colour.r, colour.g, colour.b, colour.a]);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, rgba);
            }
        }
    }

    /// Outlines a rectangle with a stroke of `line_width` pixels drawn inside
    /// its bounds.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, colour: Colour) {
        let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
        let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
        let lw = line_width.min(w).min(h).max(1.0);
        self.fill_rect(x, y, w, lw, colour);
        self.fill_rect(x, y + h - lw, w, lw, colour);
        self.fill_rect(x, y, lw, h, colour);
        self.fill_rect(x + w - lw, y, lw, h, colour);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn span(start: f32, len: f32, limit: u32) -> (u32, u32) {
    let (a, b) = if len < 0.0 { (start + len, start) } else { (start, start + len) };
    let lo = a.floor().clamp(0.0, limit as f32) as u32;
    let hi = b.ceil().clamp(0.0, limit as f32) as u32;
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = OverlayCanvas::new(10, 10);
        canvas.fill_rect(8.0, 8.0, 5.0, 5.0, Colour::rgb(255, 0, 0));
        assert_eq!(canvas.painted(), 4);
        assert_eq!(canvas.pixel(9, 9), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(10, 0), None);
    }

    #[test]
    fn test_negative_extent() {
        let mut canvas = OverlayCanvas::new(10, 10);
        canvas.fill_rect(4.0, 4.0, -2.0, -2.0, Colour::WHITE);
        assert_eq!(canvas.painted(), 4);
        assert!(canvas.pixel(2, 2).is_some_and(|c| c.a == 255));
    }

    #[test]
    fn test_stroke_leaves_interior() {
        let mut canvas = OverlayCanvas::new(20, 20);
        canvas.stroke_rect(2.0, 2.0, 10.0, 10.0, 2.0, Colour::WHITE);
        assert_eq!(canvas.pixel(6, 6).map(|c| c.a), Some(0));
        assert_eq!(canvas.pixel(2, 6).map(|c| c.a), Some(255));
        assert_eq!(canvas.pixel(11, 6).map(|c| c.a), Some(255));
    }

    #[test]
    fn test_resize_clears() {
        let mut canvas = OverlayCanvas::new(4, 4);
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Colour::WHITE);
        canvas.resize(4, 4);
        assert_eq!(canvas.painted(), 0);
        canvas.resize(8, 2);
        assert_eq!((canvas.width(), canvas.height()), (8, 2));
    }

    proptest! {
        #[test]
        fn stroke_ignores_extent_sign(
            x in -8i32..40,
            y in -8i32..40,
            w in -24i32..24,
            h in -24i32..24,
            line_width in 1u8..4,
        ) {
            let (x, y, w, h, lw) = (x as f32, y as f32, w as f32, h as f32, f32::from(line_width));
            let mut forward = OverlayCanvas::new(32, 32);
            forward.stroke_rect(x, y, w, h, lw, Colour::WHITE);
            let mut backward = OverlayCanvas::new(32, 32);
            backward.stroke_rect(x + w, y + h, -w, -h, lw, Colour::WHITE);
            prop_assert_eq!(forward.painted(), backward.painted());
            prop_assert!(forward == backward);
        }
    }
}
