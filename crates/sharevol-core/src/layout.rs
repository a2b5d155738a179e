//! Viewport layout engine.
//!
//! A layout string such as `"xyz|Y_"` describes which slice panes are shown
//! and how they are stacked. Characters are processed left to right:
//!
//! | char      | effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `x y z`   | emit a pane for axis 0/1/2, unrotated                     |
//! | `X`       | emit an X pane rotated by -90 degrees                     |
//! | `Y`       | emit a Y pane rotated by 180 degrees                      |
//! | `Z`       | emit a Z pane with the 360 degree marker                  |
//! | `\|`      | start a new column                                        |
//! | `_`       | flip Y for the whole layout                               |
//! | `-`       | align to the bottom instead of the top                    |
//! | `0-9 .`   | magnification of the next emitted pane                   |
//!
//! Whitespace is ignored; any other character is rejected.

use glam::Vec3;

use crate::error::{Result, ViewerError};
use crate::tier::ResolutionTier;
use crate::view::{Axis, Rotation, SliceView, Viewport};

/// Default gap in pixels between stacked panes.
pub const DEFAULT_GAP: u32 = 5;

/// Inputs to a layout pass besides the layout string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Volume dimensions (loaded resolution times scale).
    pub dims: Vec3,
    /// Resolution tier of the loaded atlas.
    pub tier: ResolutionTier,
    /// Global zoom factor.
    pub zoom: f32,
    /// Gap between panes in pixels.
    pub gap: u32,
}

impl LayoutParams {
    /// Creates parameters with the default gap.
    pub fn new(dims: Vec3, tier: ResolutionTier, zoom: f32) -> Self {
        Self {
            dims,
            tier,
            zoom,
            gap: DEFAULT_GAP,
        }
    }

    /// Sets the gap between panes.
    #[must_use]
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}

/// Result of parsing a layout string.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    views: Vec<SliceView>,
    width: u32,
    height: u32,
    flip_y: bool,
    align_top: bool,
    column_breaks: Vec<usize>,
}

impl Layout {
    /// Parses `text` into positioned slice views.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidLayout`] for unknown characters, an
    /// unparsable magnification or a non-positive zoom.
    pub fn parse(text: &str, params: &LayoutParams) -> Result<Self> {
        if !(params.zoom.is_finite() && params.zoom > 0.0) {
            return Err(ViewerError::InvalidLayout(format!(
                "zoom must be positive, got {}",
                params.zoom
            )));
        }

        let mut parser = Parser::new(params);
        for (pos, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            if ch.is_ascii_digit() || ch == '.' {
                parser.magnify.push(ch);
                continue;
            }
            match ch {
                'x' => parser.emit(Axis::X, Rotation::None)?,
                'y' => parser.emit(Axis::Y, Rotation::None)?,
                'z' => parser.emit(Axis::Z, Rotation::None)?,
                'X' => parser.emit(Axis::X, Rotation::Left)?,
                'Y' => parser.emit(Axis::Y, Rotation::Half)?,
                'Z' => parser.emit(Axis::Z, Rotation::Turn)?,
                '|' => parser.new_column(pos),
                '_' => parser.flip_y = true,
                '-' => parser.align_top = false,
                other => {
                    return Err(ViewerError::InvalidLayout(format!(
                        "unexpected character '{other}' at position {pos} in \"{text}\""
                    )))
                }
            }
            parser.magnify.clear();
        }
        if !parser.magnify.is_empty() {
            log::debug!("trailing magnification '{}' ignored", parser.magnify);
        }
        Ok(parser.finish())
    }

    /// Positioned views in emission order.
    pub fn views(&self) -> &[SliceView] {
        &self.views
    }

    /// Overall width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Overall height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the layout flips the Y axis of every pane.
    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    /// Whether panes align to the top of the canvas.
    pub fn align_top(&self) -> bool {
        self.align_top
    }

    /// Character positions of the column breaks.
    pub fn column_breaks(&self) -> &[usize] {
        &self.column_breaks
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.column_breaks.len() + 1
    }

    /// Index of the view containing a top-left-origin canvas point.
    pub fn view_at(&self, px: f32, py: f32, canvas_height: u32) -> Option<usize> {
        self.views
            .iter()
            .position(|v| v.viewport().contains(px, py, canvas_height))
    }
}

struct Parser<'a> {
    params: &'a LayoutParams,
    views: Vec<SliceView>,
    magnify: String,
    x: u32,
    y: u32,
    row_width: u32,
    y_max: u32,
    flip_y: bool,
    align_top: bool,
    column_breaks: Vec<usize>,
}

impl<'a> Parser<'a> {
    fn new(params: &'a LayoutParams) -> Self {
        Self {
            params,
            views: Vec::new(),
            magnify: String::new(),
            x: 0,
            y: 0,
            row_width: 0,
            y_max: 0,
            flip_y: false,
            align_top: true,
            column_breaks: Vec::new(),
        }
    }

    fn magnification(&self) -> Result<f32> {
        if self.magnify.is_empty() {
            return Ok(1.0);
        }
        match self.magnify.parse::<f32>() {
            Ok(m) if m.is_finite() && m > 0.0 => Ok(m),
            _ => Err(ViewerError::InvalidLayout(format!(
                "invalid magnification '{}'",
                self.magnify
            ))),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn emit(&mut self, axis: Axis, rotation: Rotation) -> Result<()> {
        let magnify = self.magnification()?;
        let (i, j) = axis.plane_axes();
        let extent = |k: usize| {
            let d = self.params.dims[k];
            if k == 2 {
                d / self.params.tier.scale()
            } else {
                d
            }
        };
        let scale = self.params.zoom * magnify;
        let mut w = (extent(i) * scale).round().max(0.0) as u32;
        let mut h = (extent(j) * scale).round().max(0.0) as u32;
        if rotation.swaps_extent() {
            std::mem::swap(&mut w, &mut h);
        }

        self.views.push(SliceView::new(
            axis,
            rotation,
            magnify,
            Viewport::new(self.x, self.y, w, h),
        ));

        self.y += h + self.params.gap;
        self.row_width = self.row_width.max(w + self.params.gap);
        self.y_max = self.y_max.max(self.y);
        Ok(())
    }

    fn new_column(&mut self, pos: usize) {
        self.y = 0;
        self.x += self.row_width;
        self.row_width = 0;
        self.column_breaks.push(pos);
    }

    fn finish(self) -> Layout {
        Layout {
            views: self.views,
            width: self.x + self.row_width,
            height: self.y_max,
            flip_y: self.flip_y,
            align_top: self.align_top,
            column_breaks: self.column_breaks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> LayoutParams {
        LayoutParams::new(Vec3::new(256.0, 256.0, 128.0), ResolutionTier::Full, 1.0)
    }

    #[test]
    fn test_single_view_size() {
        let layout = Layout::parse("z", &params()).unwrap();
        assert_eq!(layout.views().len(), 1);
        assert_eq!(layout.views()[0].viewport(), Viewport::new(0, 0, 256, 256));
        assert_eq!(layout.width(), 261);
        assert_eq!(layout.height(), 261);
        assert!(layout.align_top());
        assert!(!layout.flip_y());
    }

    #[test]
    fn test_stacking_and_columns() {
        let layout = Layout::parse("xyz|Y_", &params()).unwrap();
        let views = layout.views();
        assert_eq!(views.len(), 4);
        assert_eq!(layout.columns(), 2);
        assert_eq!(layout.column_breaks(), &[3]);
        assert!(layout.flip_y());

        // x pane shows (z, y): 128 x 256
        assert_eq!(views[0].viewport(), Viewport::new(0, 0, 128, 256));
        // y pane shows (x, z): 256 x 128
        assert_eq!(views[1].viewport(), Viewport::new(0, 261, 256, 128));
        assert_eq!(views[2].viewport(), Viewport::new(0, 394, 256, 256));
        // second column starts after the widest pane plus the gap
        assert_eq!(views[3].viewport(), Viewport::new(261, 0, 256, 128));
        assert_eq!(views[3].rotation(), Rotation::Half);
        assert_eq!(layout.width(), 261 + 261);
        assert_eq!(layout.height(), 655);
    }

    #[test]
    fn test_rotation_swaps_extent() {
        let layout = Layout::parse("X", &params()).unwrap();
        let vp = layout.views()[0].viewport();
        assert_eq!((vp.width, vp.height), (256, 128));
    }

    #[test]
    fn test_magnification_applies_to_next_view_only() {
        let layout = Layout::parse("0.5zz", &params()).unwrap();
        assert_eq!(layout.views()[0].viewport().width, 128);
        assert_eq!(layout.views()[0].magnify(), 0.5);
        assert_eq!(layout.views()[1].viewport().width, 256);
    }

    #[test]
    fn test_magnification_cleared_by_control_chars() {
        let layout = Layout::parse("2|z", &params()).unwrap();
        assert_eq!(layout.views()[0].viewport().width, 256);
    }

    #[test]
    fn test_tier_divides_z_extent() {
        let p = LayoutParams::new(Vec3::new(64.0, 64.0, 128.0), ResolutionTier::Quarter, 1.0);
        let layout = Layout::parse("x", &p).unwrap();
        assert_eq!(layout.views()[0].viewport().width, 32);
    }

    #[test]
    fn test_bottom_alignment_and_whitespace() {
        let layout = Layout::parse(" x -", &params()).unwrap();
        assert!(!layout.align_top());
        assert_eq!(layout.views().len(), 1);
    }

    #[test]
    fn test_rejects_unknown_characters() {
        assert!(matches!(
            Layout::parse("xw", &params()),
            Err(ViewerError::InvalidLayout(_))
        ));
        assert!(Layout::parse("1.2.3x", &params()).is_err());
        assert!(Layout::parse("x", &LayoutParams::new(Vec3::ONE, ResolutionTier::Full, 0.0)).is_err());
    }

    #[test]
    fn test_view_at() {
        let layout = Layout::parse("zz", &params()).unwrap();
        let canvas_height = layout.height();
        // first pane sits at the bottom of the GL canvas, so lowest on screen
        let idx = layout.view_at(10.0, (canvas_height - 10) as f32, canvas_height);
        assert_eq!(idx, Some(0));
        assert_eq!(layout.view_at(10.0, 10.0, canvas_height), Some(1));
        assert_eq!(layout.view_at(300.0, 10.0, canvas_height), None);
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(
            text in "[xyzXYZ|_\\-]{0,12}",
            zoom in 0.1f32..4.0,
        ) {
            let p = LayoutParams::new(Vec3::new(300.0, 200.0, 100.0), ResolutionTier::Half, zoom);
            let a = Layout::parse(&text, &p).unwrap();
            let b = Layout::parse(&text, &p).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
