//! GPU uniform records for the slice, raycast and line passes.
//!
//! All records are `#[repr(C)]` and padded to 16-byte multiples so they can
//! be uploaded to a uniform buffer as-is.

use glam::{Mat4, Vec3, Vec4};

/// Uniforms of one slice pane draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SliceUniforms {
    /// Pane model transform.
    pub model: [[f32; 4]; 4],
    /// Normalized slice position on each axis (w unused).
    pub slice: [f32; 4],
    /// Loaded voxel resolution (w unused).
    pub res: [f32; 4],
    /// Pane viewport (x, y, width, height).
    pub viewport: [f32; 4],
    /// Atlas tile grid (columns, rows).
    pub tiles: [f32; 2],
    /// Crosshair position in canvas pixels.
    pub select: [i32; 2],
    pub brightness: f32,
    pub contrast: f32,
    pub power: f32,
    /// Non-zero to colour through the palette texture.
    pub colourmap: u32,
    /// Axis the pane looks down.
    pub axis: u32,
    pub _padding: [u32; 3],
}

impl Default for SliceUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            slice: [0.5, 0.5, 0.5, 0.0],
            res: [1.0, 1.0, 1.0, 0.0],
            viewport: [0.0; 4],
            tiles: [1.0, 1.0],
            select: [0, 0],
            brightness: 0.0,
            contrast: 1.0,
            power: 1.0,
            colourmap: 0,
            axis: 2,
            _padding: [0; 3],
        }
    }
}

/// Uniforms of the raycast pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Inverse projection used to unproject fragment positions into rays.
    pub inv_projection: [[f32; 4]; 4],
    pub viewport: [f32; 4],
    pub bb_min: [f32; 4],
    pub bb_max: [f32; 4],
    pub resolution: [f32; 4],
    /// Isosurface colour, alpha is the isosurface opacity.
    pub iso_colour: [f32; 4],
    /// Data value range.
    pub range: [f32; 2],
    /// Density clip range.
    pub den_min_max: [f32; 2],
    pub tiles: [f32; 2],
    pub samples: u32,
    pub enable_colour: u32,
    pub filter: u32,
    pub iso_walls: u32,
    pub density: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub power: f32,
    pub isovalue: f32,
    pub isosmooth: f32,
    pub _padding: [f32; 3],
}

impl Default for VolumeUniforms {
    fn default() -> Self {
        Self {
            model_view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            inv_projection: Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [0.0; 4],
            bb_min: [0.0; 4],
            bb_max: [1.0, 1.0, 1.0, 0.0],
            resolution: [1.0, 1.0, 1.0, 0.0],
            iso_colour: [1.0, 1.0, 1.0, 0.75],
            range: [0.0, 1.0],
            den_min_max: [0.0, 1.0],
            tiles: [1.0, 1.0],
            samples: 256,
            enable_colour: 0,
            filter: 0,
            iso_walls: 0,
            density: 10.0,
            saturation: 1.0,
            brightness: 0.0,
            contrast: 1.0,
            power: 1.0,
            isovalue: 0.0,
            isosmooth: 1.0,
            _padding: [0.0; 3],
        }
    }
}

/// Uniforms of a line draw (bounding box, region boxes, axis gizmo).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Line colour; a zero alpha selects per-vertex colours.
    pub colour: [f32; 4],
    pub alpha: f32,
    pub _padding: [f32; 3],
}

impl LineUniforms {
    /// Creates line uniforms.
    pub fn new(model_view: Mat4, projection: Mat4, colour: Vec4, alpha: f32) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            colour: colour.to_array(),
            alpha,
            _padding: [0.0; 3],
        }
    }
}

impl Default for LineUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::ONE, 1.0)
    }
}

/// Pads a vector to four components with a zero `w`.
pub fn vec3_padded(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}
