//! Orthogonal slice views with brush segmentation.
//!
//! The slicer owns the slice cursors, the pane layout and the brush labels.
//! Cursors on X and Y are kept in native voxel units so they survive a
//! change of resolution tier; Z is never downscaled. Region boxes belong to
//! the volume raycaster and are passed in when drawing.

use glam::{UVec3, Vec2, Vec3};
use image::RgbaImage;
use sharevol_core::brush::distinct_colours;
use sharevol_core::scene::SlicesRecord;
use sharevol_core::{
    AtlasLayout, Axis, BoxSet, Colour, LabelSet, Layout, LayoutParams, Result, SliceView,
    SlicerProperties, ViewerError, VolumeDescriptor,
};
use sharevol_render::{
    decode_atlas, encode_png, rasterize_points, vec3_padded, DrawBackend, OverlayCanvas,
    SliceTexture, SliceUniforms, Surface,
};

/// Width of the brush palette strip uploaded for the brush texture pass.
pub const PALETTE_WIDTH: u32 = 2048;

/// Stroke width of region box outlines, in pixels.
pub const BOX_LINE_WIDTH: f32 = 2.0;

/// Slice renderer and brush engine.
#[derive(Debug, Clone)]
pub struct Slicer {
    descriptor: VolumeDescriptor,
    atlas: AtlasLayout,
    properties: SlicerProperties,
    cursor: UVec3,
    gap: u32,
    layout: Layout,
    labels: LabelSet,
    overlay: OverlayCanvas,
    brush_image: Option<RgbaImage>,
    brush_dirty: bool,
    palette_dirty: bool,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_u32(v: f32) -> u32 {
    v.round().max(0.0) as u32
}

impl Slicer {
    /// Builds a slicer from a slices record.
    ///
    /// The record's zoom is relative to the native resolution and is scaled
    /// up by the tier so panes keep their on-screen size.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidLayout`] if the layout string or zoom
    /// is invalid.
    pub fn new(
        descriptor: VolumeDescriptor,
        atlas: AtlasLayout,
        record: &SlicesRecord,
        gap: u32,
    ) -> Result<Self> {
        let mut properties = record.properties.clone();
        properties.zoom *= descriptor.tier().scale();

        let native = descriptor.native();
        let half = (descriptor.native_f32() * 0.5).round();
        let cursor = UVec3::new(
            properties.x.unwrap_or(round_u32(half.x)),
            properties.y.unwrap_or(round_u32(half.y)),
            properties.z.unwrap_or(round_u32(half.z)),
        )
        .min(native);

        let layout = Layout::parse(&properties.layout, &Self::params(&descriptor, &properties, gap))?;
        let mut labels = LabelSet::new();
        labels.load_saved(&record.saved_labels);

        log::info!(
            "slicer: layout '{}' with {} views, {} x {} px",
            properties.layout,
            layout.views().len(),
            layout.width(),
            layout.height()
        );

        Ok(Self {
            overlay: OverlayCanvas::new(layout.width(), layout.height()),
            descriptor,
            atlas,
            properties,
            cursor,
            gap,
            layout,
            labels,
            brush_image: None,
            brush_dirty: false,
            palette_dirty: false,
        })
    }

    fn params(descriptor: &VolumeDescriptor, properties: &SlicerProperties, gap: u32) -> LayoutParams {
        LayoutParams::new(descriptor.dims(), descriptor.tier(), properties.zoom).with_gap(gap)
    }

    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }

    pub fn properties(&self) -> &SlicerProperties {
        &self.properties
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// The overlay as rasterized by the last draw.
    pub fn overlay(&self) -> &OverlayCanvas {
        &self.overlay
    }

    /// Whether an imported brush atlas is loaded.
    pub fn has_brush_atlas(&self) -> bool {
        self.brush_image.is_some()
    }

    /// Slice cursors; X and Y in native voxel units.
    pub fn cursor(&self) -> UVec3 {
        self.cursor
    }

    /// Slice cursors in loaded atlas units.
    #[allow(clippy::cast_precision_loss)]
    pub fn loaded_cursor(&self) -> Vec3 {
        let f = self.descriptor.tier().scale();
        Vec3::new(
            self.cursor.x as f32 / f,
            self.cursor.y as f32 / f,
            self.cursor.z as f32,
        )
    }

    /// Normalized slice positions, as handed to the slice shader.
    pub fn slices(&self) -> Vec3 {
        let res = self.descriptor.loaded_f32();
        let c = self.loaded_cursor();
        let frac = |c: f32, r: f32| {
            if r > 1.0 {
                ((c - 1.0) / (r - 1.0)).clamp(0.0, 1.0)
            } else {
                0.5
            }
        };
        Vec3::new(frac(c.x, res.x), frac(c.y, res.y), frac(c.z, res.z))
    }

    /// Moves the cursor on `axis` to `value` native voxels.
    pub fn set_cursor(&mut self, axis: Axis, value: u32) {
        let k = axis.index();
        self.cursor[k] = value.min(self.descriptor.native()[k]);
    }

    /// Moves the cursor on `axis` to a fraction of the native resolution.
    pub fn set_slice(&mut self, axis: Axis, fraction: f32) {
        let native = self.descriptor.native_f32()[axis.index()];
        self.set_cursor(axis, round_u32(fraction.clamp(0.0, 1.0) * native));
    }

    /// Clip extents in native voxel units, defaulting to the full volume.
    pub fn clip(&self) -> (Vec3, Vec3) {
        let p = &self.properties;
        let native = self.descriptor.native_f32();
        (
            Vec3::new(
                p.min_x.unwrap_or(0.0),
                p.min_y.unwrap_or(0.0),
                p.min_z.unwrap_or(0.0),
            ),
            Vec3::new(
                p.max_x.unwrap_or(native.x),
                p.max_y.unwrap_or(native.y),
                p.max_z.unwrap_or(native.z),
            ),
        )
    }

    /// Sets the clip extents in native voxel units.
    pub fn set_clip(&mut self, min: Vec3, max: Vec3) {
        let p = &mut self.properties;
        p.min_x = Some(min.x);
        p.min_y = Some(min.y);
        p.min_z = Some(min.z);
        p.max_x = Some(max.x);
        p.max_y = Some(max.y);
        p.max_z = Some(max.z);
    }

    fn relayout(&mut self, layout: &str, zoom: f32) -> Result<()> {
        let mut properties = self.properties.clone();
        properties.layout = layout.to_owned();
        properties.zoom = zoom;
        self.layout = Layout::parse(layout, &Self::params(&self.descriptor, &properties, self.gap))?;
        self.properties = properties;
        self.overlay.resize(self.layout.width(), self.layout.height());
        Ok(())
    }

    /// Replaces the layout string. An invalid string leaves the current
    /// layout in place.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidLayout`] if the string cannot be parsed.
    pub fn set_layout(&mut self, layout: &str) -> Result<()> {
        let zoom = self.properties.zoom;
        self.relayout(layout, zoom)
    }

    /// Sets the pane zoom, relative to the loaded resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidLayout`] for a non-positive zoom.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        let layout = self.properties.layout.clone();
        self.relayout(&layout, zoom)
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.properties.brightness = brightness;
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        self.properties.contrast = contrast;
    }

    pub fn set_power(&mut self, power: f32) {
        self.properties.power = power;
    }

    pub fn set_usecolourmap(&mut self, usecolourmap: bool) {
        self.properties.usecolourmap = usecolourmap;
    }

    pub fn set_show(&mut self, show: bool) {
        self.properties.show = show;
    }

    /// Shows or hides the panes, returning the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.properties.show = !self.properties.show;
        self.properties.show
    }

    pub fn set_enable_brush(&mut self, enable: bool) {
        self.properties.enable_brush = enable;
    }

    pub fn set_show_brush(&mut self, show: bool) {
        self.properties.show_brush = show;
    }

    pub fn set_draw_rectangles(&mut self, draw: bool) {
        self.properties.draw_rectangles = draw;
    }

    /// Sets the brush overlay alpha.
    pub fn set_brush_transparency(&mut self, alpha: u8) {
        self.properties.brush_transparency = alpha;
    }

    /// Remembers where the imported brush atlas came from, untiered.
    pub fn set_import_atlas_url(&mut self, url: Option<String>) {
        self.properties.import_atlas_url = url;
    }

    /// Recolours the current label.
    pub fn set_brush_colour(&mut self, colour: [u8; 3]) {
        self.properties.brush_colour = colour;
        self.labels.set_current_colour(colour);
        self.palette_dirty = true;
    }

    /// Starts a new unsaved label.
    pub fn new_label(&mut self, name: impl Into<String>, colour: [u8; 3]) {
        self.labels.new_label(name, colour);
        self.properties.brush_colour = colour;
    }

    pub fn rename_label(&mut self, name: impl Into<String>) -> bool {
        self.labels.rename_draft(name)
    }

    /// Saves the current draft label.
    pub fn save_label(&mut self) {
        self.labels.save_label();
    }

    /// Makes a saved label current.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownLabel`] for an unknown name.
    pub fn select_label(&mut self, name: &str) -> Result<()> {
        self.labels.select_label(name)?;
        self.properties.brush_colour = self.labels.current().colour();
        Ok(())
    }

    /// Index of the pane under a canvas point (top-left origin).
    pub fn view_at(&self, position: Vec2) -> Option<usize> {
        self.layout.view_at(position.x, position.y, self.layout.height())
    }

    fn view(&self, idx: usize) -> Result<&SliceView> {
        self.layout.views().get(idx).ok_or(ViewerError::UnknownView(idx))
    }

    /// Pointer position normalized to a pane, top-left origin.
    #[allow(clippy::cast_precision_loss)]
    fn pane_pointer(&self, view: &SliceView, position: Vec2) -> Vec2 {
        let vp = view.viewport();
        let top = vp.top(self.layout.height()) as f32;
        Vec2::new(
            (position.x - vp.x as f32) / vp.width.max(1) as f32,
            (position.y - top) / vp.height.max(1) as f32,
        )
    }

    /// Handles a click at `pointer`, normalized to pane `idx` with a
    /// top-left origin.
    ///
    /// Moves the two in-plane cursors to the clicked voxel and, with the
    /// brush enabled, paints the clicked point with the current label.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownView`] for a bad pane index.
    pub fn click(&mut self, idx: usize, pointer: Vec2) -> Result<()> {
        let view = self.view(idx)?.clone();
        let coord = view.pointer_to_plane(pointer, self.layout.flip_y());
        let loaded = self.descriptor.loaded_f32();
        let factor = self.descriptor.tier().factor();
        let (i, j, k) = (view.i(), view.j(), view.axis().index());

        let to_native = |axis: usize, v: u32| if axis == 2 { v } else { v * factor };
        let a = round_u32(loaded[i] * coord.x);
        let b = round_u32(loaded[j] * coord.y);
        let native = self.descriptor.native();
        self.cursor[i] = to_native(i, a).min(native[i]);
        self.cursor[j] = to_native(j, b).min(native[j]);

        let inside = pointer.x > 0.0 && pointer.x < 1.0 && pointer.y > 0.0 && pointer.y < 1.0;
        if self.properties.enable_brush && inside {
            let mut point = Vec3::ZERO;
            point[i] = coord.x;
            point[j] = coord.y;
            point[k] = self.loaded_cursor()[k] / loaded[k];
            self.labels.paint(point);
        }
        Ok(())
    }

    /// Clicks the pane under a canvas point. Returns whether a pane was hit.
    pub fn pointer_down(&mut self, position: Vec2) -> bool {
        let Some(idx) = self.view_at(position) else {
            return false;
        };
        let pointer = match self.view(idx) {
            Ok(view) => self.pane_pointer(view, position),
            Err(_) => return false,
        };
        self.click(idx, pointer).is_ok()
    }

    /// Dragging repeats the click at every position.
    pub fn pointer_drag(&mut self, position: Vec2) -> bool {
        self.pointer_down(position)
    }

    /// Steps the cursor of pane `idx`'s own axis by the wheel spin.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownView`] for a bad pane index.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn wheel(&mut self, idx: usize, spin: f32) -> Result<()> {
        let axis = self.view(idx)?.axis();
        let current = i64::from(self.cursor[axis.index()]);
        let next = (current + spin.round() as i64).max(0);
        self.set_cursor(axis, u32::try_from(next).unwrap_or(u32::MAX));
        Ok(())
    }

    /// Wheel over a canvas point. Returns whether a pane was hit.
    pub fn wheel_at(&mut self, position: Vec2, spin: f32) -> bool {
        match self.view_at(position) {
            Some(idx) => self.wheel(idx, spin).is_ok(),
            None => false,
        }
    }

    /// Registers one label per distinct non-black colour of an imported
    /// brush atlas and keeps the image for the brush texture pass.
    ///
    /// Painted points are not reconstructed from the image. Returns the
    /// number of labels registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or does not tile the
    /// loaded voxel resolution.
    pub fn import_brush(&mut self, bytes: &[u8]) -> Result<usize> {
        let image = decode_atlas(bytes)?;
        let loaded = self.descriptor.loaded();
        AtlasLayout::new(image.width(), image.height(), loaded.x, loaded.y)?;

        let colours = distinct_colours(image.as_raw());
        for (n, colour) in colours.iter().enumerate() {
            self.labels.register_imported(&(n + 1).to_string(), *colour);
        }
        log::info!("imported brush atlas with {} labels", colours.len());

        self.brush_image = Some(image);
        self.brush_dirty = true;
        self.palette_dirty = true;
        Ok(colours.len())
    }

    /// Rasterizes every label's points into a PNG the size of the atlas.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidImage`] if encoding fails.
    pub fn export_brush(&self) -> Result<Vec<u8>> {
        let pixels = self.labels.atlas_pixels(&self.atlas, self.descriptor.loaded());
        let image = rasterize_points(self.atlas.width(), self.atlas.height(), &pixels);
        let bytes = encode_png(&image)?;
        log::info!(
            "exported {} brush points into a {} x {} atlas",
            pixels.len(),
            image.width(),
            image.height()
        );
        Ok(bytes)
    }

    /// Record for saving. X/Y cursors stay in native units and zoom is
    /// converted back to native scale; unsaved drafts are not included.
    pub fn record(&self) -> SlicesRecord {
        let mut properties = self.properties.clone();
        properties.x = Some(self.cursor.x);
        properties.y = Some(self.cursor.y);
        properties.z = Some(self.cursor.z);
        properties.zoom /= self.descriptor.tier().scale();
        SlicesRecord {
            properties,
            saved_labels: self.labels.to_saved(),
            extra: serde_json::Map::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn slice_uniforms(&self, view: &SliceView, slices: Vec3, flip_y: bool) -> SliceUniforms {
        let vp = view.viewport();
        SliceUniforms {
            model: view.model_matrix(flip_y).to_cols_array_2d(),
            slice: vec3_padded(slices),
            res: vec3_padded(self.descriptor.loaded_f32()),
            viewport: [vp.x as f32, vp.y as f32, vp.width as f32, vp.height as f32],
            tiles: self.atlas.tiles(),
            select: view.crosshair(view.plane_of(slices), flip_y),
            brightness: self.properties.brightness,
            contrast: self.properties.contrast,
            power: self.properties.power,
            colourmap: u32::from(self.properties.usecolourmap),
            axis: view.axis().index() as u32,
            _padding: [0; 3],
        }
    }

    fn upload_brush<B: DrawBackend>(&mut self, backend: &mut B) {
        if self.brush_dirty {
            if let Some(image) = &self.brush_image {
                backend.upload_texture(SliceTexture::Brush, image);
            }
            self.brush_dirty = false;
        }
        if self.palette_dirty {
            backend.upload_palette(&self.labels.palette().to_rgba_strip(PALETTE_WIDTH));
            self.palette_dirty = false;
        }
    }

    /// Draws every pane and the overlay. Hidden slicers draw nothing.
    pub fn draw<B: DrawBackend>(&mut self, backend: &mut B, boxes: &BoxSet) {
        if !self.properties.show {
            return;
        }
        self.upload_brush(backend);
        backend.begin_frame(Surface::Slices, Colour::rgba(0, 0, 0, 0));

        let flip_y = self.layout.flip_y();
        let slices = self.slices();
        for (idx, view) in self.layout.views().iter().enumerate() {
            let uniforms = self.slice_uniforms(view, slices, flip_y);
            backend.draw_slice(idx, SliceTexture::Atlas, &uniforms);
            if self.brush_image.is_some() {
                let brush = SliceUniforms {
                    colourmap: 1,
                    ..uniforms
                };
                backend.draw_slice(idx, SliceTexture::Brush, &brush);
            }
        }

        self.overlay.resize(self.layout.width(), self.layout.height());
        if self.properties.draw_rectangles {
            self.draw_boxes(boxes);
        }
        if self.properties.enable_brush || self.properties.show_brush {
            self.draw_brush();
        }
        backend.present_overlay(&self.overlay);
        backend.end_frame();
    }

    fn draw_boxes(&mut self, boxes: &BoxSet) {
        let height = self.layout.height();
        let flip_y = self.layout.flip_y();
        let depth = self.loaded_cursor() / self.descriptor.loaded_f32();
        for view in self.layout.views() {
            let axis = view.axis();
            for b in boxes {
                if !b.crosses(axis, depth[axis.index()]) {
                    continue;
                }
                let a = view.plane_to_canvas(view.plane_of(b.min()), flip_y, height);
                let c = view.plane_to_canvas(view.plane_of(b.max()), flip_y, height);
                self.overlay.stroke_rect(
                    a.x,
                    a.y,
                    c.x - a.x,
                    c.y - a.y,
                    BOX_LINE_WIDTH,
                    b.colour().with_alpha(255),
                );
            }
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn draw_brush(&mut self) {
        let height = self.layout.height();
        let flip_y = self.layout.flip_y();
        let loaded = self.descriptor.loaded_f32();
        let cursor = self.loaded_cursor();
        let tier = self.descriptor.tier().scale();
        let alpha = self.properties.brush_transparency;

        for view in self.layout.views() {
            let (i, j, k) = (view.i(), view.j(), view.axis().index());
            let vp = view.viewport();
            let plane_px = view.plane_extent_to_canvas(Vec2::new(vp.width as f32, vp.height as f32));
            let stretch = |axis: usize| if axis == 2 { tier } else { 1.0 };
            let voxel = Vec2::new(
                plane_px.x / loaded[i] * stretch(i),
                plane_px.y / loaded[j] * stretch(j),
            );
            let size = view.plane_extent_to_canvas(voxel).ceil();
            let slice = cursor[k].round() as i64;

            for label in self.labels.drawable() {
                let colour = Colour::from(label.colour()).with_alpha(alpha);
                for p in label.points() {
                    if (p[k] * loaded[k]).round() as i64 != slice {
                        continue;
                    }
                    let pos = view.plane_to_canvas(view.plane_of(*p), flip_y, height);
                    self.overlay.fill_rect(pos.x, pos.y, size.x, size.y, colour);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharevol_core::brush::DEFAULT_LABEL_COLOUR;
    use sharevol_core::{IntersectionBox, ResolutionTier};
    use sharevol_render::{decode_atlas, DrawCall, RecordingBackend};

    fn small(layout: &str) -> Slicer {
        let descriptor = VolumeDescriptor::new(UVec3::new(8, 8, 4), Vec3::ONE, ResolutionTier::Full, false);
        let atlas = AtlasLayout::new(16, 16, 8, 8).unwrap();
        let mut record = SlicesRecord::default();
        record.properties.layout = layout.to_owned();
        Slicer::new(descriptor, atlas, &record, 5).unwrap()
    }

    #[test]
    fn test_default_cursor_is_centre() {
        let s = small("z");
        assert_eq!(s.cursor(), UVec3::new(4, 4, 2));
        assert_eq!(s.layout().height(), 13);
    }

    #[test]
    fn test_click_moves_cursors_and_paints() {
        let mut s = small("z");
        s.click(0, Vec2::new(0.25, 0.75)).unwrap();
        assert_eq!(s.cursor(), UVec3::new(2, 6, 2));
        let points = s.labels().current().points();
        assert_eq!(points, &[Vec3::new(0.25, 0.75, 0.5)]);

        s.set_enable_brush(false);
        s.click(0, Vec2::new(0.5, 0.5)).unwrap();
        assert_eq!(s.labels().current().points().len(), 1);
        assert!(matches!(s.click(3, Vec2::ZERO), Err(ViewerError::UnknownView(3))));
    }

    #[test]
    fn test_upper_z_pane_clicks_like_lower_z() {
        let mut lower = small("z");
        let mut upper = small("Z");
        assert_eq!(lower.layout().views()[0].viewport(), upper.layout().views()[0].viewport());
        for pointer in [Vec2::new(0.25, 0.5), Vec2::new(0.875, 0.125)] {
            lower.click(0, pointer).unwrap();
            upper.click(0, pointer).unwrap();
            assert_eq!(lower.cursor(), upper.cursor(), "{pointer}");
        }
        assert_eq!(lower.cursor(), UVec3::new(7, 1, 2));
        assert_eq!(lower.labels().current().points(), upper.labels().current().points());
        assert_eq!(upper.labels().current().points()[0], Vec3::new(0.25, 0.5, 0.5));
    }

    #[test]
    fn test_pointer_down_hits_pane() {
        let mut s = small("z");
        // pane occupies rows 5..13 of a 13 px canvas
        assert!(!s.pointer_down(Vec2::new(4.0, 2.0)));
        assert!(s.pointer_down(Vec2::new(4.0, 9.0)));
        assert_eq!(s.cursor().x, 4);
        assert_eq!(s.cursor().y, 4);
    }

    #[test]
    fn test_wheel_steps_own_axis() {
        let mut s = small("zx");
        s.wheel(0, 1.0).unwrap();
        assert_eq!(s.cursor().z, 3);
        s.wheel(1, -10.0).unwrap();
        assert_eq!(s.cursor().x, 0);
        s.wheel(0, 10.0).unwrap();
        assert_eq!(s.cursor().z, 4);
    }

    #[test]
    fn test_brush_overlay_on_current_slice_only() {
        let mut s = small("z");
        s.click(0, Vec2::new(0.5, 0.5)).unwrap();
        let mut backend = RecordingBackend::new();
        s.draw(&mut backend, &BoxSet::new());
        let expected = Colour::from(DEFAULT_LABEL_COLOUR);
        assert_eq!(s.overlay().pixel(4, 9), Some(expected));
        assert_eq!(s.overlay().painted(), 1);

        s.set_cursor(Axis::Z, 3);
        s.draw(&mut backend, &BoxSet::new());
        assert_eq!(s.overlay().painted(), 0);
    }

    #[test]
    fn test_brush_transparency() {
        let mut s = small("z");
        s.click(0, Vec2::new(0.5, 0.5)).unwrap();
        s.set_brush_transparency(128);
        s.draw(&mut RecordingBackend::new(), &BoxSet::new());
        assert_eq!(s.overlay().pixel(4, 9).map(|c| c.a), Some(128));
    }

    #[test]
    fn test_box_outline_when_slice_crosses() {
        let mut s = small("z");
        s.set_enable_brush(false);
        s.set_show_brush(false);
        let mut boxes = BoxSet::new();
        boxes.push(IntersectionBox::new(
            "ROI",
            Colour::rgb(255, 0, 0),
            Vec3::splat(0.25),
            Vec3::splat(0.75),
            1.0,
        ));
        s.draw(&mut RecordingBackend::new(), &boxes);
        assert_eq!(s.overlay().pixel(2, 7), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(s.overlay().pixel(1, 7).map(|c| c.a), Some(0));

        s.set_cursor(Axis::Z, 0);
        s.draw(&mut RecordingBackend::new(), &boxes);
        assert_eq!(s.overlay().painted(), 0);

        s.set_cursor(Axis::Z, 2);
        s.set_draw_rectangles(false);
        s.draw(&mut RecordingBackend::new(), &boxes);
        assert_eq!(s.overlay().painted(), 0);
    }

    #[test]
    fn test_draw_calls() {
        let mut s = small("zx");
        let mut backend = RecordingBackend::new();
        s.draw(&mut backend, &BoxSet::new());
        assert_eq!(backend.frames(Surface::Slices), 1);
        let slices: Vec<_> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Slice { view, texture, uniforms } => Some((*view, *texture, uniforms.axis)),
                _ => None,
            })
            .collect();
        assert_eq!(slices, vec![(0, SliceTexture::Atlas, 2), (1, SliceTexture::Atlas, 0)]);

        backend.clear();
        s.toggle();
        s.draw(&mut backend, &BoxSet::new());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_export_places_points_in_atlas() {
        let mut s = small("z");
        s.click(0, Vec2::new(0.5, 0.5)).unwrap();
        let png = s.export_brush().unwrap();
        let image = decode_atlas(&png).unwrap();
        assert_eq!(image.dimensions(), (16, 16));
        // slice 2 sits in tile (0, 1)
        let [r, g, b] = DEFAULT_LABEL_COLOUR;
        assert_eq!(image.get_pixel(4, 12).0, [r, g, b, 255]);
        assert_eq!(image.pixels().filter(|p| p.0[3] != 0).count(), 1);
    }

    #[test]
    fn test_import_registers_colours() {
        let mut s = small("z");
        let mut image = RgbaImage::new(16, 16);
        image.put_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        image.put_pixel(9, 9, image::Rgba([0, 0, 255, 255]));
        image.put_pixel(3, 3, image::Rgba([255, 0, 0, 255]));
        let png = encode_png(&image).unwrap();

        assert_eq!(s.import_brush(&png).unwrap(), 2);
        assert!(s.labels().names().contains(&"1"));
        assert!(s.labels().names().contains(&"2"));
        assert!(s.labels().saved().iter().all(|l| l.points().is_empty()));

        let mut backend = RecordingBackend::new();
        s.draw(&mut backend, &BoxSet::new());
        assert_eq!(backend.uploads(SliceTexture::Brush), 1);
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, DrawCall::Slice { texture: SliceTexture::Brush, uniforms, .. } if uniforms.colourmap == 1)));

        backend.clear();
        s.draw(&mut backend, &BoxSet::new());
        assert_eq!(backend.uploads(SliceTexture::Brush), 0);
    }

    #[test]
    fn test_import_rejects_mismatched_atlas() {
        let mut s = small("z");
        let png = encode_png(&RgbaImage::new(12, 16)).unwrap();
        assert!(matches!(s.import_brush(&png), Err(ViewerError::MalformedAtlas { .. })));
        assert!(!s.has_brush_atlas());
    }

    #[test]
    fn test_invalid_layout_keeps_previous() {
        let mut s = small("zx");
        assert!(s.set_layout("zq").is_err());
        assert_eq!(s.layout().views().len(), 2);
        assert_eq!(s.properties().layout, "zx");
        s.set_layout("xyz").unwrap();
        assert_eq!(s.layout().views().len(), 3);
    }

    #[test]
    fn test_record_converts_zoom_and_cursor() {
        let descriptor = VolumeDescriptor::new(
            UVec3::new(32, 32, 4),
            Vec3::ONE,
            ResolutionTier::Half,
            false,
        );
        let atlas = AtlasLayout::new(32, 32, 16, 16).unwrap();
        let mut record = SlicesRecord::default();
        record.properties.x = Some(10);
        record.properties.zoom = 1.5;
        let mut s = Slicer::new(descriptor, atlas, &record, 5).unwrap();
        assert!((s.properties().zoom - 3.0).abs() < 1e-6);
        assert!((s.loaded_cursor().x - 5.0).abs() < 1e-6);

        s.click(0, Vec2::new(0.5, 0.5)).unwrap();
        let saved = s.record();
        assert!((saved.properties.zoom - 1.5).abs() < 1e-6);
        assert_eq!(saved.properties.x, Some(s.cursor().x));
        assert_eq!(saved.saved_labels.len(), 1);
    }
}
