//! Draw backend seam.
//!
//! The viewer computes every uniform and overlay on the CPU and hands them
//! to a [`DrawBackend`]. A wgpu host implements the trait with real
//! pipelines; [`RecordingBackend`] keeps the calls for inspection.
//!
//! Box outlines are drawn from per-box vertex buffers. A backend keeps them
//! in a [`LineBufferCache`]: the buffer handle for a box stays the same for
//! the life of the box and its contents are rewritten when the geometry
//! changes.

use std::collections::HashMap;

use image::RgbaImage;
use sharevol_core::{Colour, LineGeometry};

use crate::overlay::OverlayCanvas;
use crate::uniforms::{LineUniforms, SliceUniforms, VolumeUniforms};

/// Which canvas a frame is drawn to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The raycast volume canvas.
    Volume,
    /// The slice pane canvas.
    Slices,
}

/// Detail level of a volume frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Interactive redraw with halved samples and no filtering.
    Low,
    /// Final redraw.
    High,
}

/// Texture sampled by a slice pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceTexture {
    /// The volume atlas.
    Atlas,
    /// The imported brush atlas, coloured through the brush palette.
    Brush,
}

/// Line geometry drawn by a line pass.
#[derive(Debug, Clone, PartialEq)]
pub enum LineShape {
    /// The three-line RGB axis gizmo.
    Axis,
    /// The volume bounding box.
    Bounds(LineGeometry),
    /// A named region box.
    Region { name: String, geometry: LineGeometry },
}

impl LineShape {
    /// Box geometry, absent for the axis gizmo.
    pub fn geometry(&self) -> Option<&LineGeometry> {
        match self {
            LineShape::Axis => None,
            LineShape::Bounds(geometry) | LineShape::Region { geometry, .. } => Some(geometry),
        }
    }

    fn key(&self) -> Option<LineKey> {
        match self {
            LineShape::Axis => None,
            LineShape::Bounds(_) => Some(LineKey::Bounds),
            LineShape::Region { name, .. } => Some(LineKey::Region(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LineKey {
    Bounds,
    Region(String),
}

/// What syncing a shape did to its vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSync {
    /// First draw of the shape; a buffer was allocated.
    Created { handle: u32 },
    /// The geometry changed; the same buffer was rewritten.
    Rewritten { handle: u32 },
    /// The buffer already holds this geometry.
    Current { handle: u32 },
}

impl LineSync {
    pub fn handle(self) -> u32 {
        match self {
            LineSync::Created { handle }
            | LineSync::Rewritten { handle }
            | LineSync::Current { handle } => handle,
        }
    }

    /// Whether vertex data had to be written.
    pub fn writes(self) -> bool {
        !matches!(self, LineSync::Current { .. })
    }
}

/// Vertex buffer bookkeeping for the bounding box and each named region box.
#[derive(Debug, Clone, Default)]
pub struct LineBufferCache {
    buffers: HashMap<LineKey, (u32, LineGeometry)>,
    next_handle: u32,
}

impl LineBufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the buffer for `shape` up to date before it is drawn.
    ///
    /// Returns `None` for shapes without box geometry.
    pub fn sync(&mut self, shape: &LineShape) -> Option<LineSync> {
        let key = shape.key()?;
        let geometry = *shape.geometry()?;
        if let Some((handle, uploaded)) = self.buffers.get_mut(&key) {
            if *uploaded == geometry {
                return Some(LineSync::Current { handle: *handle });
            }
            *uploaded = geometry;
            return Some(LineSync::Rewritten { handle: *handle });
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.buffers.insert(key, (handle, geometry));
        Some(LineSync::Created { handle })
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Receives the draw calls of one frame.
pub trait DrawBackend {
    /// Replaces the contents of a slice texture.
    fn upload_texture(&mut self, texture: SliceTexture, image: &RgbaImage);

    /// Replaces the brush palette, an RGBA strip one pixel high.
    fn upload_palette(&mut self, strip: &[u8]);

    /// Starts a frame and clears colour and depth.
    fn begin_frame(&mut self, surface: Surface, background: Colour);

    /// Draws one slice pane.
    fn draw_slice(&mut self, view: usize, texture: SliceTexture, uniforms: &SliceUniforms);

    /// Draws line geometry.
    fn draw_lines(&mut self, shape: &LineShape, uniforms: &LineUniforms);

    /// Runs the raycast pass.
    fn draw_volume(&mut self, uniforms: &VolumeUniforms, quality: Quality);

    /// Clears the depth buffer only.
    fn clear_depth(&mut self);

    /// Composites the 2D overlay over the slice canvas.
    fn present_overlay(&mut self, overlay: &OverlayCanvas);

    /// Finishes the frame.
    fn end_frame(&mut self);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Upload { texture: SliceTexture, width: u32, height: u32 },
    Palette { len: usize },
    Begin { surface: Surface, background: Colour },
    Slice { view: usize, texture: SliceTexture, uniforms: SliceUniforms },
    LineBuffer { sync: LineSync },
    Lines { shape: LineShape, uniforms: LineUniforms },
    Volume { uniforms: VolumeUniforms, quality: Quality },
    ClearDepth,
    Overlay { painted: usize, width: u32, height: u32 },
    End,
}

/// Backend that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Vec<DrawCall>,
    last_overlay: Option<OverlayCanvas>,
    lines: LineBufferCache,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since creation or the last [`RecordingBackend::clear`].
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// The most recently presented overlay.
    pub fn last_overlay(&self) -> Option<&OverlayCanvas> {
        self.last_overlay.as_ref()
    }

    /// Forgets recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.last_overlay = None;
    }

    /// Number of raycast passes of the given quality.
    pub fn volume_passes(&self, quality: Quality) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Volume { quality: q, .. } if *q == quality))
            .count()
    }

    /// Number of uploads to a texture.
    pub fn uploads(&self, texture: SliceTexture) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Upload { texture: t, .. } if *t == texture))
            .count()
    }

    /// Line buffer writes (allocations and rewrites) since the last clear.
    pub fn line_writes(&self) -> Vec<LineSync> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::LineBuffer { sync } if sync.writes() => Some(*sync),
                _ => None,
            })
            .collect()
    }

    /// Line buffers allocated so far. Survives [`RecordingBackend::clear`].
    pub fn line_buffers(&self) -> &LineBufferCache {
        &self.lines
    }

    /// Number of frames started on a surface.
    pub fn frames(&self, surface: Surface) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Begin { surface: s, .. } if *s == surface))
            .count()
    }
}

impl DrawBackend for RecordingBackend {
    fn upload_texture(&mut self, texture: SliceTexture, image: &RgbaImage) {
        self.calls.push(DrawCall::Upload {
            texture,
            width: image.width(),
            height: image.height(),
        });
    }

    fn upload_palette(&mut self, strip: &[u8]) {
        self.calls.push(DrawCall::Palette { len: strip.len() });
    }

    fn begin_frame(&mut self, surface: Surface, background: Colour) {
        self.calls.push(DrawCall::Begin { surface, background });
    }

    fn draw_slice(&mut self, view: usize, texture: SliceTexture, uniforms: &SliceUniforms) {
        self.calls.push(DrawCall::Slice {
            view,
            texture,
            uniforms: *uniforms,
        });
    }

    fn draw_lines(&mut self, shape: &LineShape, uniforms: &LineUniforms) {
        if let Some(sync) = self.lines.sync(shape) {
            self.calls.push(DrawCall::LineBuffer { sync });
        }
        self.calls.push(DrawCall::Lines {
            shape: shape.clone(),
            uniforms: *uniforms,
        });
    }

    fn draw_volume(&mut self, uniforms: &VolumeUniforms, quality: Quality) {
        self.calls.push(DrawCall::Volume {
            uniforms: *uniforms,
            quality,
        });
    }

    fn clear_depth(&mut self) {
        self.calls.push(DrawCall::ClearDepth);
    }

    fn present_overlay(&mut self, overlay: &OverlayCanvas) {
        self.calls.push(DrawCall::Overlay {
            painted: overlay.painted(),
            width: overlay.width(),
            height: overlay.height(),
        });
        self.last_overlay = Some(overlay.clone());
    }

    fn end_frame(&mut self) {
        self.calls.push(DrawCall::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use sharevol_core::IntersectionBox;

    #[test]
    fn test_recording_counts() {
        let mut backend = RecordingBackend::new();
        backend.begin_frame(Surface::Volume, Colour::BLACK);
        backend.draw_volume(&VolumeUniforms::default(), Quality::Low);
        backend.clear_depth();
        backend.end_frame();
        backend.begin_frame(Surface::Volume, Colour::BLACK);
        backend.draw_volume(&VolumeUniforms::default(), Quality::High);
        backend.end_frame();

        assert_eq!(backend.frames(Surface::Volume), 2);
        assert_eq!(backend.frames(Surface::Slices), 0);
        assert_eq!(backend.volume_passes(Quality::Low), 1);
        assert_eq!(backend.volume_passes(Quality::High), 1);

        backend.clear();
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_overlay_is_kept() {
        let mut backend = RecordingBackend::new();
        let mut overlay = OverlayCanvas::new(4, 4);
        overlay.fill_rect(0.0, 0.0, 1.0, 1.0, Colour::WHITE);
        backend.present_overlay(&overlay);
        assert_eq!(backend.last_overlay().map(OverlayCanvas::painted), Some(1));
    }

    #[test]
    fn test_line_buffers_rewritten_in_place() {
        let mut cache = LineBufferCache::new();
        let mut roi = IntersectionBox::unit(1.0);
        let region = |b: &IntersectionBox| LineShape::Region {
            name: "ROI".into(),
            geometry: *b.geometry(),
        };
        let bounds = LineShape::Bounds(*IntersectionBox::unit(1.0).geometry());

        assert_eq!(cache.sync(&LineShape::Axis), None);
        assert_eq!(cache.sync(&region(&roi)), Some(LineSync::Created { handle: 0 }));
        assert_eq!(cache.sync(&bounds), Some(LineSync::Created { handle: 1 }));
        assert_eq!(cache.sync(&region(&roi)), Some(LineSync::Current { handle: 0 }));

        roi.set_bounds(Vec3::splat(0.25), Vec3::splat(0.75));
        assert_eq!(cache.sync(&region(&roi)), Some(LineSync::Rewritten { handle: 0 }));
        assert_eq!(cache.sync(&bounds), Some(LineSync::Current { handle: 1 }));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_recording_backend_syncs_before_drawing_lines() {
        let mut backend = RecordingBackend::new();
        let shape = LineShape::Bounds(*IntersectionBox::unit(1.0).geometry());
        backend.draw_lines(&shape, &LineUniforms::default());
        backend.draw_lines(&shape, &LineUniforms::default());
        backend.draw_lines(&LineShape::Axis, &LineUniforms::default());
        assert_eq!(backend.line_writes(), vec![LineSync::Created { handle: 0 }]);
        assert!(matches!(backend.calls()[0], DrawCall::LineBuffer { .. }));
        assert!(matches!(backend.calls()[1], DrawCall::Lines { .. }));

        backend.clear();
        backend.draw_lines(&shape, &LineUniforms::default());
        assert!(backend.line_writes().is_empty());
        assert_eq!(backend.line_buffers().len(), 1);
    }

    #[test]
    fn test_uploads_are_recorded() {
        let mut backend = RecordingBackend::new();
        backend.upload_texture(SliceTexture::Atlas, &RgbaImage::new(8, 4));
        backend.upload_palette(&[0; 16]);
        assert_eq!(backend.uploads(SliceTexture::Atlas), 1);
        assert_eq!(backend.uploads(SliceTexture::Brush), 0);
        assert_eq!(backend.calls()[1], DrawCall::Palette { len: 16 });
    }
}
