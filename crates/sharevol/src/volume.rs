//! Volume raycaster state, interaction and draw passes.
//!
//! Clip sliders are held in native voxel units and converted into the
//! normalized bounding box handed to the raycast pass, with Z mapped into
//! texture space by the atlas fill ratio.

use std::time::{Duration, Instant};

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use sharevol_core::math::quat_from_scene_rotate;
use sharevol_core::properties::{normalize_samples, MIN_SAMPLES};
use sharevol_core::scene::{ColourValue, IntersectionRecord, ObjectRecord, ViewRecord};
use sharevol_core::{
    AtlasLayout, BoxSet, Colour, IntersectionBox, RenderPreset, Result, ViewPreset,
    VolumeDescriptor, VolumeProperties,
};
use sharevol_render::{
    vec3_padded, DrawBackend, LineShape, LineUniforms, OrbitCamera, Quality, Surface,
    VolumeUniforms,
};

use crate::input::PointerButton;

/// Default canvas background.
pub const DEFAULT_BACKGROUND: u32 = 0xff41_4952;
/// Border colour before any background is applied.
pub const DEFAULT_BORDER: u32 = 0xffd9_d5d0;

/// Alpha of the axis and bounding box redrawn over the volume.
pub const OVERLAY_ALPHA: f32 = 0.2;

/// Dolly per unit of wheel spin, in model sizes.
pub const WHEEL_ZOOM: f32 = 0.05;
/// Near plane shift per unit of wheel spin with the modifier held.
pub const WHEEL_NEAR: f32 = 0.01;
/// Dolly per pixel of pinch distance, in model sizes.
pub const PINCH_ZOOM: f32 = 0.0001;

/// Frame time budget of the speed test.
pub const SPEED_TEST_BUDGET: Duration = Duration::from_secs(1);

/// Sample count after a speed test that took `elapsed`.
///
/// Returns `None` when the frames fit in [`SPEED_TEST_BUDGET`]; otherwise
/// samples are scaled down by the overrun, never below [`MIN_SAMPLES`].
pub fn reduced_samples(samples: u32, elapsed: Duration) -> Option<u32> {
    if elapsed <= SPEED_TEST_BUDGET {
        return None;
    }
    let reduced = u128::from(samples) * 1000 / elapsed.as_millis().max(1);
    Some(u32::try_from(reduced).unwrap_or(u32::MAX).max(MIN_SAMPLES))
}

/// Counts timed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTest {
    frames: u32,
    target: u32,
    started: Instant,
}

impl SpeedTest {
    pub fn new(target: u32, now: Instant) -> Self {
        Self {
            frames: 0,
            target: target.max(1),
            started: now,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Counts a finished frame. Returns the total elapsed time once the
    /// target frame count is reached.
    pub fn frame(&mut self, now: Instant) -> Option<Duration> {
        self.frames += 1;
        (self.frames >= self.target).then(|| now.saturating_duration_since(self.started))
    }
}

/// Which way the last region-of-interest transfer went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiMode {
    /// A box was copied into the clip sliders.
    Viewing,
    /// The clip sliders were copied into a box.
    Calibrating,
}

/// Raycast volume renderer.
#[derive(Debug, Clone)]
pub struct VolumeRaycaster {
    descriptor: VolumeDescriptor,
    atlas: AtlasLayout,
    properties: VolumeProperties,
    camera: OrbitCamera,
    clip_min: Vec3,
    clip_max: Vec3,
    bounds: IntersectionBox,
    boxes: BoxSet,
    current_box: Option<String>,
    show_intersection: bool,
    roi_mode: Option<RoiMode>,
    background: Colour,
    border_colour: Colour,
    canvas: UVec2,
    sample_ceiling: u32,
    speed_test: Option<SpeedTest>,
}

impl VolumeRaycaster {
    /// Creates a raycaster with default properties and full clip range.
    pub fn new(descriptor: VolumeDescriptor, atlas: AtlasLayout, sample_ceiling: u32) -> Self {
        let fill = atlas.fill_ratio(descriptor.loaded().z);
        let mut volume = Self {
            camera: OrbitCamera::new(descriptor.scaling()),
            clip_min: Vec3::ONE,
            clip_max: descriptor.native_f32(),
            bounds: IntersectionBox::unit(fill),
            boxes: BoxSet::new(),
            current_box: None,
            show_intersection: false,
            roi_mode: None,
            background: Colour::from_argb(DEFAULT_BACKGROUND),
            border_colour: Colour::from_argb(DEFAULT_BORDER),
            canvas: UVec2::new(1, 1),
            sample_ceiling: sample_ceiling.max(MIN_SAMPLES),
            speed_test: None,
            properties: VolumeProperties::default(),
            descriptor,
            atlas,
        };
        volume.properties.samples = volume.properties.samples.min(volume.sample_ceiling);
        volume
    }

    /// Creates a raycaster from the scene's object and view records.
    ///
    /// # Errors
    ///
    /// Returns [`sharevol_core::ViewerError::InvalidScene`] for an
    /// unparsable colour.
    pub fn from_records(
        descriptor: VolumeDescriptor,
        atlas: AtlasLayout,
        sample_ceiling: u32,
        object: &ObjectRecord,
        view: &ViewRecord,
    ) -> Result<Self> {
        let mut volume = Self::new(descriptor, atlas, sample_ceiling);
        volume.load_records(object, view)?;
        Ok(volume)
    }

    /// Replaces properties, clip range, boxes and camera with the records'.
    ///
    /// # Errors
    ///
    /// Returns [`sharevol_core::ViewerError::InvalidScene`] for an
    /// unparsable colour. Nothing is changed in that case.
    pub fn load_records(&mut self, object: &ObjectRecord, view: &ViewRecord) -> Result<()> {
        let colour = object.colour.as_ref().map(ColourValue::to_colour).transpose()?;
        let native = self.descriptor.native_f32();
        let fill = self.fill_ratio();

        let mut boxes = BoxSet::new();
        for record in &object.intersections {
            boxes.push(IntersectionBox::new(
                record.name.clone(),
                record.color.to_colour()?,
                Vec3::from(record.min_vertices) / native,
                Vec3::from(record.max_vertices) / native,
                fill,
            ));
        }

        let defaults = VolumeProperties::default();
        let mut p = defaults.clone();
        p.samples = self.limit_samples(object.samples.unwrap_or(defaults.samples));
        p.isovalue = object.isovalue.unwrap_or(defaults.isovalue);
        p.isowalls = object.isowalls.unwrap_or(defaults.isowalls);
        p.isoalpha = object.isoalpha.unwrap_or(defaults.isoalpha);
        p.isosmooth = object.isosmooth.unwrap_or(defaults.isosmooth);
        p.colour = colour.map_or(defaults.colour, Colour::to_rgb);
        p.density = object.density.unwrap_or(defaults.density);
        p.power = object.power.unwrap_or(defaults.power);
        p.saturation = object.saturation.unwrap_or(defaults.saturation);
        p.brightness = object.brightness.unwrap_or(defaults.brightness);
        p.contrast = object.contrast.unwrap_or(defaults.contrast);
        p.mindensity = object.mindensity.unwrap_or(defaults.mindensity);
        p.maxdensity = object.maxdensity.unwrap_or(defaults.maxdensity);
        p.usecolourmap = object.colourmap.is_some();
        p.tricubic_filter = object.tricubicfilter.unwrap_or(defaults.tricubic_filter);
        p.axes = view.axes.unwrap_or(defaults.axes);
        p.border = view.border.unwrap_or(defaults.border);
        p.interactive = self.properties.interactive;

        // Stored clip values are normalized with Z in texture space.
        let slider = |v: Option<f32>, n: f32, default: f32| v.map_or(default, |v| v * n);
        let zn = if fill > 0.0 { native.z / fill } else { native.z };
        self.clip_min = Vec3::new(
            slider(object.xmin, native.x, 1.0),
            slider(object.ymin, native.y, 1.0),
            slider(object.zmin, zn, 1.0),
        );
        self.clip_max = Vec3::new(
            slider(object.xmax, native.x, native.x),
            slider(object.ymax, native.y, native.y),
            slider(object.zmax, zn, native.z),
        );
        p.clip_min = Vec3::new(
            object.xmin.unwrap_or(0.0),
            object.ymin.unwrap_or(0.0),
            object.zmin.unwrap_or(0.0),
        );
        p.clip_max = Vec3::new(
            object.xmax.unwrap_or(1.0),
            object.ymax.unwrap_or(1.0),
            object.zmax.unwrap_or(1.0),
        );

        let mut camera = OrbitCamera::new(self.descriptor.scaling());
        if let Some(t) = view.translate {
            camera.set_translate(Vec3::from(t));
        }
        if let Some(q) = view.rotate.as_deref().and_then(quat_from_scene_rotate) {
            camera.set_rotation(q.normalize());
        }
        if let Some(f) = view.focus {
            camera.set_focus(Vec3::from(f));
        }

        self.properties = p;
        self.boxes = boxes;
        self.camera = camera;
        self.current_box = None;
        self.roi_mode = None;
        self.show_intersection = false;
        Ok(())
    }

    /// Writes properties, clip range and boxes into an object record and
    /// the camera into a view record.
    ///
    /// With `export_matrix` the view gets the model-view matrix instead of
    /// translate and rotate.
    pub fn save_records(&self, object: &mut ObjectRecord, view: &mut ViewRecord, export_matrix: bool) {
        let p = &self.properties;
        object.samples = Some(p.samples);
        object.isovalue = Some(p.isovalue);
        object.isowalls = Some(p.isowalls);
        object.isoalpha = Some(p.isoalpha);
        object.isosmooth = Some(p.isosmooth);
        object.colour = Some(ColourValue::from(Colour::from(p.colour)));
        object.density = Some(p.density);
        object.power = Some(p.power);
        object.saturation = Some(p.saturation);
        object.brightness = Some(p.brightness);
        object.contrast = Some(p.contrast);
        object.mindensity = Some(p.mindensity);
        object.maxdensity = Some(p.maxdensity);
        object.colourmap = if p.usecolourmap {
            Some(object.colourmap.unwrap_or(0))
        } else {
            None
        };
        object.tricubicfilter = Some(p.tricubic_filter);
        object.xmin = Some(p.clip_min.x);
        object.ymin = Some(p.clip_min.y);
        object.zmin = Some(p.clip_min.z);
        object.xmax = Some(p.clip_max.x);
        object.ymax = Some(p.clip_max.y);
        object.zmax = Some(p.clip_max.z);

        let native = self.descriptor.native_f32();
        object.intersections = self
            .boxes
            .iter()
            .map(|b| IntersectionRecord {
                name: b.name().to_owned(),
                color: ColourValue::from(b.colour()),
                min_vertices: (b.min() * native).to_array(),
                max_vertices: (b.max() * native).to_array(),
            })
            .collect();

        view.axes = Some(p.axes);
        view.border = Some(p.border);
        view.focus = Some(self.camera.focus().to_array());
        if export_matrix {
            view.modelview = Some(self.camera.model_view().to_cols_array().to_vec());
            view.translate = None;
            view.rotate = None;
        } else {
            view.translate = Some(self.camera.translate().to_array());
            view.rotate = Some(self.camera.rotation().to_array().to_vec());
            view.modelview = None;
        }
    }

    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    pub fn properties(&self) -> &VolumeProperties {
        &self.properties
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn boxes(&self) -> &BoxSet {
        &self.boxes
    }

    /// The unit bounding box.
    pub fn bounds(&self) -> &IntersectionBox {
        &self.bounds
    }

    pub fn current_box(&self) -> Option<&str> {
        self.current_box.as_deref()
    }

    pub fn roi_mode(&self) -> Option<RoiMode> {
        self.roi_mode
    }

    pub fn background(&self) -> Colour {
        self.background
    }

    pub fn border_colour(&self) -> Colour {
        self.border_colour
    }

    /// Fraction of the atlas depth holding voxel data.
    pub fn fill_ratio(&self) -> f32 {
        self.atlas.fill_ratio(self.descriptor.loaded().z)
    }

    /// Clip sliders in native voxel units.
    pub fn clip(&self) -> (Vec3, Vec3) {
        (self.clip_min, self.clip_max)
    }

    /// Sets the clip sliders in native voxel units and recomputes the
    /// normalized bounding box.
    pub fn set_clip(&mut self, min: Vec3, max: Vec3) {
        self.clip_min = min;
        self.clip_max = max;
        let native = self.descriptor.native_f32();
        let fill = self.fill_ratio();
        let normalize = |v: Vec3| {
            let n = v / native;
            Vec3::new(n.x, n.y, n.z * fill)
        };
        self.properties.clip_min = normalize(min);
        self.properties.clip_max = normalize(max);
    }

    /// Applies a background colour and picks a contrasting border.
    pub fn set_background(&mut self, background: Colour) {
        self.background = background;
        self.border_colour = background.contrasting_border();
    }

    /// Colour the volume canvas is cleared to.
    pub fn canvas_background(&self) -> Colour {
        if self.properties.usecolourmap {
            self.background
        } else {
            Colour::BLACK
        }
    }

    /// Sets the canvas size in pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = UVec2::new(width.max(1), height.max(1));
    }

    pub fn canvas_size(&self) -> UVec2 {
        self.canvas
    }

    fn limit_samples(&self, samples: u32) -> u32 {
        normalize_samples(samples).min(self.sample_ceiling)
    }

    /// Sets the sample count, normalized and capped for the device.
    pub fn set_samples(&mut self, samples: u32) {
        self.properties.samples = self.limit_samples(samples);
    }

    pub fn set_density(&mut self, density: f32) {
        self.properties.density = density;
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

    pub fn set_saturation(&mut self, saturation: f32) {
        self.properties.saturation = saturation;
    }

    /// Density window passed to the transfer function.
    pub fn set_density_range(&mut self, min: f32, max: f32) {
        self.properties.mindensity = min;
        self.properties.maxdensity = max;
    }

    pub fn set_isovalue(&mut self, isovalue: f32) {
        self.properties.isovalue = isovalue;
    }

    pub fn set_isoalpha(&mut self, isoalpha: f32) {
        self.properties.isoalpha = isoalpha;
    }

    pub fn set_isosmooth(&mut self, isosmooth: f32) {
        self.properties.isosmooth = isosmooth;
    }

    pub fn set_isowalls(&mut self, isowalls: bool) {
        self.properties.isowalls = isowalls;
    }

    /// Isosurface colour.
    pub fn set_colour(&mut self, colour: [u8; 3]) {
        self.properties.colour = colour;
    }

    pub fn set_usecolourmap(&mut self, usecolourmap: bool) {
        self.properties.usecolourmap = usecolourmap;
    }

    pub fn set_tricubic_filter(&mut self, filter: bool) {
        self.properties.tricubic_filter = filter;
    }

    pub fn set_axes(&mut self, axes: bool) {
        self.properties.axes = axes;
    }

    pub fn set_border(&mut self, border: bool) {
        self.properties.border = border;
    }

    /// Whether the volume pass runs during interaction.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.properties.interactive = interactive;
    }

    /// Overwrites the preset's properties with its exact values. The device
    /// sample ceiling is applied when the raycast uniforms are built.
    pub fn apply_preset(&mut self, preset: RenderPreset) {
        preset.apply(&mut self.properties);
    }

    /// Samples per ray actually traced at full quality.
    pub fn effective_samples(&self) -> u32 {
        self.properties.samples.min(self.sample_ceiling)
    }

    /// Snaps the camera to a fixed orientation.
    pub fn apply_view_preset(&mut self, preset: ViewPreset) {
        self.camera.set_rotation(preset.rotation());
    }

    /// Draws the current box on its own pass.
    pub fn set_show_intersection(&mut self, show: bool) {
        self.show_intersection = show;
    }

    /// Makes a box current without moving any bounds.
    ///
    /// # Errors
    ///
    /// Returns [`sharevol_core::ViewerError::UnknownBox`] for an unknown name.
    pub fn select_box(&mut self, name: &str) -> Result<()> {
        self.boxes.get(name)?;
        self.current_box = Some(name.to_owned());
        Ok(())
    }

    /// Copies a box into the clip sliders and makes it current.
    ///
    /// # Errors
    ///
    /// Returns [`sharevol_core::ViewerError::UnknownBox`] for an unknown name.
    pub fn view_into(&mut self, name: &str) -> Result<()> {
        let native = self.descriptor.native_f32();
        let b = self.boxes.get_mut(name)?;
        let (min, max) = (b.min(), b.max());
        b.set_bounds(min, max);
        self.set_clip(min * native, max * native);
        self.current_box = Some(name.to_owned());
        self.roi_mode = Some(RoiMode::Viewing);
        log::debug!("viewing box '{name}'");
        Ok(())
    }

    /// Copies the clip sliders into a box and makes it current.
    ///
    /// # Errors
    ///
    /// Returns [`sharevol_core::ViewerError::UnknownBox`] for an unknown name.
    pub fn calibrate_from(&mut self, name: &str) -> Result<()> {
        let native = self.descriptor.native_f32();
        let (min, max) = (self.clip_min / native, self.clip_max / native);
        self.boxes.get_mut(name)?.set_bounds(min, max);
        self.current_box = Some(name.to_owned());
        self.roi_mode = Some(RoiMode::Calibrating);
        log::info!("calibrated box '{name}' to {min} .. {max}");
        Ok(())
    }

    /// Handles a pointer drag. Returns whether the camera moved.
    pub fn drag(&mut self, button: PointerButton, delta: Vec2) -> bool {
        let divisor = sharevol_render::camera::ROTATE_DIVISOR;
        match button {
            PointerButton::Primary => {
                self.camera.rotate_y(delta.x / divisor);
                self.camera.rotate_x(delta.y / divisor);
            }
            PointerButton::Middle => self.camera.rotate_z(delta.length() / divisor),
            PointerButton::Secondary => self.camera.pan(delta.x, delta.y),
        }
        delta != Vec2::ZERO
    }

    /// Zooms, or moves the near plane while the modifier is held.
    pub fn wheel(&mut self, spin: f32, modifier: bool) {
        if modifier {
            self.camera.adjust_near(spin * WHEEL_NEAR);
        } else {
            self.camera.zoom(spin * WHEEL_ZOOM);
        }
    }

    pub fn pinch(&mut self, distance: f32) {
        self.camera.zoom(distance * PINCH_ZOOM);
    }

    /// Starts timing frames.
    pub fn start_speed_test(&mut self, frames: u32, now: Instant) {
        self.speed_test = Some(SpeedTest::new(frames, now));
    }

    pub fn speed_test_running(&self) -> bool {
        self.speed_test.is_some()
    }

    /// Counts a speed test frame. When the test completes, reduces the
    /// sample count if the frames were too slow and returns the new count.
    pub fn speed_test_frame(&mut self, now: Instant) -> Option<u32> {
        let test = self.speed_test.as_mut()?;
        let frames = test.frames() + 1;
        let elapsed = test.frame(now)?;
        self.speed_test = None;
        log::info!("{frames} frames in {:.3} seconds", elapsed.as_secs_f32());
        let samples = reduced_samples(self.effective_samples(), elapsed)?;
        log::info!("reduced quality to {samples} samples");
        self.properties.samples = samples;
        Some(samples)
    }

    #[allow(clippy::cast_precision_loss)]
    fn aspect(&self) -> f32 {
        self.canvas.x as f32 / self.canvas.y as f32
    }

    fn line_uniforms(&self, model: Mat4, colour: Vec4, alpha: f32) -> LineUniforms {
        LineUniforms::new(
            self.camera.model_view() * model,
            self.camera.projection(self.aspect()),
            colour,
            alpha,
        )
    }

    fn draw_bounds<B: DrawBackend>(&self, backend: &mut B, alpha: f32) {
        let uniforms = self.line_uniforms(
            Mat4::from_scale(self.descriptor.scaling()),
            self.border_colour.to_vec4(),
            alpha,
        );
        backend.draw_lines(&LineShape::Bounds(*self.bounds.geometry()), &uniforms);
    }

    fn draw_region<B: DrawBackend>(&self, backend: &mut B, b: &IntersectionBox, alpha: f32) {
        let uniforms = self.line_uniforms(
            Mat4::from_scale(self.descriptor.scaling()),
            b.colour().to_vec4(),
            alpha,
        );
        let shape = LineShape::Region {
            name: b.name().to_owned(),
            geometry: *b.geometry(),
        };
        backend.draw_lines(&shape, &uniforms);
    }

    /// Axis gizmo position: the model centre, or the slice cursors when a
    /// slicer is attached.
    pub fn axis_position(&self, slices: Option<Vec3>) -> Vec3 {
        let scaling = self.descriptor.scaling();
        match slices {
            Some(s) => Vec3::new(s.x, s.y, s.z * self.fill_ratio()) * scaling,
            None => scaling * 0.5,
        }
    }

    fn draw_axis<B: DrawBackend>(&self, backend: &mut B, slices: Option<Vec3>, alpha: f32) {
        // zero alpha selects the per-vertex RGB colours
        let uniforms = self.line_uniforms(
            Mat4::from_translation(self.axis_position(slices)),
            Vec4::new(1.0, 1.0, 1.0, 0.0),
            alpha,
        );
        backend.draw_lines(&LineShape::Axis, &uniforms);
    }

    /// Uniforms of the raycast pass at the given quality.
    #[allow(clippy::cast_precision_loss)]
    pub fn volume_uniforms(&self, quality: Quality) -> VolumeUniforms {
        let p = &self.properties;
        let low = quality == Quality::Low;
        let aspect = self.aspect();
        let iso = Colour::from(p.colour).to_vec4();
        VolumeUniforms {
            model_view: self.camera.ray_model_view().to_cols_array_2d(),
            projection: self.camera.projection(aspect).to_cols_array_2d(),
            inv_projection: self.camera.inv_projection(aspect).to_cols_array_2d(),
            viewport: [0.0, 0.0, self.canvas.x as f32, self.canvas.y as f32],
            bb_min: vec3_padded(p.clip_min),
            bb_max: vec3_padded(p.clip_max),
            resolution: vec3_padded(self.descriptor.loaded_f32()),
            iso_colour: [iso.x, iso.y, iso.z, p.isoalpha],
            range: [0.0, 1.0],
            den_min_max: [p.mindensity, p.maxdensity],
            tiles: self.atlas.tiles(),
            samples: if low {
                self.effective_samples() / 2
            } else {
                self.effective_samples()
            },
            enable_colour: u32::from(p.usecolourmap),
            filter: u32::from(p.tricubic_filter && !low),
            iso_walls: u32::from(p.isowalls),
            density: p.density,
            saturation: p.saturation,
            brightness: p.brightness,
            contrast: p.contrast,
            power: p.power,
            isovalue: p.isovalue,
            isosmooth: p.isosmooth,
            _padding: [0.0; 3],
        }
    }

    /// Draws one frame. `slices` are the attached slicer's normalized
    /// slice positions, used to place the axis gizmo.
    pub fn draw<B: DrawBackend>(&self, backend: &mut B, quality: Quality, slices: Option<Vec3>) {
        let p = &self.properties;
        backend.begin_frame(Surface::Volume, self.canvas_background());

        if p.border {
            self.draw_bounds(backend, 1.0);
            for b in &self.boxes {
                self.draw_region(backend, b, 1.0);
            }
        }
        if p.axes {
            self.draw_axis(backend, slices, 1.0);
        }
        if self.show_intersection {
            if let Some(b) = self.current_box.as_deref().and_then(|n| self.boxes.get(n).ok()) {
                self.draw_region(backend, b, 1.0);
            }
        }

        if quality == Quality::Low && !p.interactive {
            // placeholder while interacting on devices that skip the volume
            if !p.axes {
                self.draw_axis(backend, slices, 1.0);
            }
            self.draw_bounds(backend, 1.0);
        } else {
            backend.draw_volume(&self.volume_uniforms(quality), quality);
        }

        backend.clear_depth();
        if p.axes {
            self.draw_axis(backend, slices, OVERLAY_ALPHA);
        }
        if p.border {
            self.draw_bounds(backend, OVERLAY_ALPHA);
        }
        backend.end_frame();
    }
}
