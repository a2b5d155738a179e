//! Slice view geometry: axes, rotations, viewports and the coordinate
//! permutations between volume plane space and on-screen view space.
//!
//! Three spaces are involved:
//! - *plane* coordinates `(a, b)`: normalized voxel coordinates along the
//!   view's in-plane axes `i` and `j`;
//! - *view* coordinates `(u, v)`: normalized position inside the viewport,
//!   after the view's fixed rotation, with `v` growing downwards;
//! - *selection* coordinates: view coordinates in bottom-left origin, as the
//!   slice shader expects them.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Principal volume axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis for a component index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// In-plane axis indices `(i, j)` shown by a view looking down this axis.
    pub fn plane_axes(self) -> (usize, usize) {
        match self {
            Axis::X => (2, 1),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

/// Fixed rotation of a slice view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// Rotated by -90 degrees.
    Left,
    /// Rotated by 180 degrees.
    Half,
    /// Full turn. Draws, selects and paints exactly like [`Rotation::None`].
    Turn,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> f32 {
        match self {
            Rotation::None => 0.0,
            Rotation::Left => -90.0,
            Rotation::Half => 180.0,
            Rotation::Turn => 360.0,
        }
    }

    /// Whether the viewport width and height are swapped.
    pub fn swaps_extent(self) -> bool {
        matches!(self, Rotation::Left)
    }

    /// Maps plane coordinates to view coordinates.
    pub fn to_view(self, plane: Vec2) -> Vec2 {
        match self {
            Rotation::Left => Vec2::new(plane.y, 1.0 - plane.x),
            Rotation::Half => Vec2::new(1.0 - plane.x, 1.0 - plane.y),
            Rotation::None | Rotation::Turn => plane,
        }
    }

    /// Maps view coordinates back to plane coordinates.
    pub fn from_view(self, view: Vec2) -> Vec2 {
        match self {
            Rotation::Left => Vec2::new(1.0 - view.y, view.x),
            Rotation::Half => Vec2::new(1.0 - view.x, 1.0 - view.y),
            Rotation::None | Rotation::Turn => view,
        }
    }
}

/// Axis-aligned rectangle in canvas pixels, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Distance from the canvas top edge to the viewport top edge.
    pub fn top(&self, canvas_height: u32) -> u32 {
        canvas_height.saturating_sub(self.y + self.height)
    }

    /// Whether a top-left-origin canvas point lies inside the viewport.
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, px: f32, py: f32, canvas_height: u32) -> bool {
        let left = self.x as f32;
        let top = self.top(canvas_height) as f32;
        px >= left
            && px < left + self.width as f32
            && py >= top
            && py < top + self.height as f32
    }
}

/// One 2D slice pane bound to a principal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceView {
    axis: Axis,
    rotation: Rotation,
    magnify: f32,
    viewport: Viewport,
}

impl SliceView {
    /// Creates a view with an explicit viewport.
    pub fn new(axis: Axis, rotation: Rotation, magnify: f32, viewport: Viewport) -> Self {
        Self {
            axis,
            rotation,
            magnify,
            viewport,
        }
    }

    /// Principal axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Fixed rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Magnification factor from the layout string.
    pub fn magnify(&self) -> f32 {
        self.magnify
    }

    /// Pixel rectangle.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Horizontal in-plane axis index.
    pub fn i(&self) -> usize {
        self.axis.plane_axes().0
    }

    /// Vertical in-plane axis index.
    pub fn j(&self) -> usize {
        self.axis.plane_axes().1
    }

    /// Extracts this view's plane coordinates from a normalized 3D point.
    pub fn plane_of(&self, point: Vec3) -> Vec2 {
        Vec2::new(point[self.i()], point[self.j()])
    }

    /// Shader model transform: centre, rotate, then scale by one half with
    /// the Y axis flipped unless the layout flips it back.
    pub fn model_matrix(&self, flip_y: bool) -> Mat4 {
        let sy = if flip_y { 0.5 } else { -0.5 };
        Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0))
            * Mat4::from_rotation_z((-self.rotation.degrees()).to_radians())
            * Mat4::from_scale(Vec3::new(0.5, sy, -1.0))
    }

    /// Normalized selection point (bottom-left origin) for plane coordinates.
    pub fn selection(&self, plane: Vec2, flip_y: bool) -> Vec2 {
        let mut sel = self.rotation.to_view(plane);
        if !flip_y {
            sel.y = 1.0 - sel.y;
        }
        sel
    }

    /// Selection crosshair in canvas pixels (bottom-left origin).
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn crosshair(&self, plane: Vec2, flip_y: bool) -> [i32; 2] {
        let sel = self.selection(plane, flip_y);
        let vp = self.viewport;
        [
            (vp.width as f32 * sel.x + vp.x as f32) as i32,
            (vp.height as f32 * sel.y + vp.y as f32) as i32,
        ]
    }

    /// Converts a pointer position, normalized to the view element with a
    /// top-left origin, into plane coordinates.
    pub fn pointer_to_plane(&self, pointer: Vec2, flip_y: bool) -> Vec2 {
        let mut view = pointer;
        if flip_y {
            view.y = 1.0 - view.y;
        }
        self.rotation.from_view(view)
    }

    /// Places plane coordinates on the overlay canvas (top-left origin pixels).
    #[allow(clippy::cast_precision_loss)]
    pub fn plane_to_canvas(&self, plane: Vec2, flip_y: bool, canvas_height: u32) -> Vec2 {
        let mut view = self.rotation.to_view(plane);
        if flip_y {
            view.y = 1.0 - view.y;
        }
        let vp = self.viewport;
        Vec2::new(
            view.x * vp.width as f32 + vp.x as f32,
            view.y * vp.height as f32 + vp.top(canvas_height) as f32,
        )
    }

    /// Canvas pixel extent (width, height) of plane extents along `i` and `j`.
    pub fn plane_extent_to_canvas(&self, extent: Vec2) -> Vec2 {
        if self.rotation.swaps_extent() {
            Vec2::new(extent.y, extent.x)
        } else {
            extent
        }
    }
}
