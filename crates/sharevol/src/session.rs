//! The session context.
//!
//! A [`Session`] owns everything one loaded scene needs: the volume
//! raycaster, the slicer, the redraw scheduler, the draw backend and the
//! session store. Components never reach each other directly; the session
//! forwards clip changes from the volume to the slicer and hands the
//! slicer's cursors to the volume when drawing.

use std::time::Instant;

use glam::{UVec3, Vec3};
use sharevol_core::scene::SlicesRecord;
use sharevol_core::{
    AtlasLayout, Colour, RenderPreset, ResolutionTier, Result, Scene, ViewPreset, ViewerError,
    ViewerOptions, VolumeDescriptor,
};
use sharevol_render::{decode_atlas, DrawBackend, Quality, SliceTexture, Surface};

use crate::capability::RenderCapability;
use crate::input::{PointerButton, PointerEvent};
use crate::scheduler::RenderScheduler;
use crate::slicer::Slicer;
use crate::source::AtlasSource;
use crate::store::SessionStore;
use crate::volume::VolumeRaycaster;

/// Settings for [`Session::load`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub options: ViewerOptions,
    /// Ignore and forget any stored session for the scene.
    pub reset: bool,
}

/// One loaded scene and its viewers.
pub struct Session<B: DrawBackend> {
    key: String,
    options: ViewerOptions,
    original: Scene,
    scene: Scene,
    descriptor: VolumeDescriptor,
    atlas: AtlasLayout,
    volume: VolumeRaycaster,
    slicer: Slicer,
    scheduler: RenderScheduler,
    backend: B,
    store: Box<dyn SessionStore>,
}

impl<B: DrawBackend> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("descriptor", &self.descriptor)
            .field("atlas", &self.atlas)
            .finish_non_exhaustive()
    }
}

/// Scene to use: the stored one unless reset, else the one given.
fn stored_scene(store: &mut dyn SessionStore, key: &str, reset: bool) -> Option<Scene> {
    if reset {
        if let Err(e) = store.remove(key) {
            log::warn!("could not clear stored session '{key}': {e}");
        }
        return None;
    }
    match store.load(key) {
        Ok(Some(text)) => match Scene::parse(&text) {
            Ok(scene) => {
                log::info!("restoring stored session '{key}'");
                Some(scene)
            }
            Err(e) => {
                log::warn!("discarding corrupt stored session '{key}': {e}");
                if let Err(e) = store.remove(key) {
                    log::warn!("could not remove stored session '{key}': {e}");
                }
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("could not read stored session '{key}': {e}");
            None
        }
    }
}

impl<B: DrawBackend> Session<B> {
    /// Loads a scene.
    ///
    /// The stored session for `key` replaces `scene_json` unless
    /// `config.reset` is set. The atlas tier is chosen from the host's
    /// texture limit, fetched through `source` and uploaded to `backend`.
    ///
    /// # Errors
    ///
    /// Fails with a capability error when the host cannot render or the
    /// atlas fits no tier, a data error for a malformed scene or atlas, and
    /// a network error when the atlas cannot be fetched.
    pub fn load(
        key: impl Into<String>,
        scene_json: &str,
        config: SessionConfig,
        capability: &dyn RenderCapability,
        source: &dyn AtlasSource,
        mut store: Box<dyn SessionStore>,
        mut backend: B,
    ) -> Result<Self> {
        let key = key.into();
        let SessionConfig { options, reset } = config;
        let original = Scene::parse(scene_json)?;
        let scene = stored_scene(store.as_mut(), &key, reset).unwrap_or_else(|| original.clone());

        let volume_record = scene.volume()?;
        let url = volume_record
            .url
            .clone()
            .ok_or_else(|| ViewerError::InvalidScene("volume has no url".into()))?;
        let res = volume_record.res.unwrap_or(sharevol_core::descriptor::DEFAULT_RESOLUTION);
        let native = UVec3::from(res);
        let native_size = volume_record.original_size.unwrap_or(native.x.max(native.y));

        let max_texture = capability.max_texture_dimension()?;
        let tier = ResolutionTier::select(native_size, max_texture)?;
        let descriptor = VolumeDescriptor::new(
            native,
            Vec3::from(volume_record.scale.unwrap_or([1.0; 3])),
            tier,
            volume_record.autoscale.unwrap_or(true),
        );

        let atlas_url = tier.atlas_url(&url);
        let image = decode_atlas(&source.fetch(&atlas_url)?)?;
        let loaded = descriptor.loaded();
        let atlas = AtlasLayout::new(image.width(), image.height(), loaded.x, loaded.y)?;
        if atlas.capacity() < loaded.z {
            return Err(ViewerError::MalformedAtlas {
                width: image.width(),
                height: image.height(),
                res_x: loaded.x,
                res_y: loaded.y,
            });
        }
        log::info!(
            "loaded {atlas_url}: {} x {} atlas, {} x {} tiles, tier {tier:?}",
            atlas.width(),
            atlas.height(),
            atlas.columns(),
            atlas.rows()
        );
        backend.upload_texture(SliceTexture::Atlas, &image);

        let (volume, slicer) = Self::build_viewers(&scene, &options, descriptor, atlas)?;
        let mut session = Self {
            key,
            scheduler: RenderScheduler::new(options.debounce()),
            options,
            original,
            scene,
            descriptor,
            atlas,
            volume,
            slicer,
            backend,
            store,
        };

        if let Some(url) = session.slicer.properties().import_atlas_url.clone() {
            if let Err(e) = session.import_brush(source, &url) {
                log::warn!("could not import brush atlas '{url}': {e}");
            }
        }
        Ok(session)
    }

    fn build_viewers(
        scene: &Scene,
        options: &ViewerOptions,
        descriptor: VolumeDescriptor,
        atlas: AtlasLayout,
    ) -> Result<(VolumeRaycaster, Slicer)> {
        let object = scene.object()?;
        let mut volume = VolumeRaycaster::new(descriptor, atlas, options.sample_ceiling());
        volume.set_interactive(options.interactive() && scene.properties.interactive.unwrap_or(true));
        volume.load_records(object, scene.view()?)?;
        if let Some(bg) = &scene.properties.background {
            volume.set_background(Colour::parse(bg)?);
        }

        let mut record = object.slices.clone().unwrap_or_else(SlicesRecord::default);
        if options.low_power {
            record.properties.show = false;
        }
        let mut slicer = Slicer::new(descriptor, atlas, &record, options.slice_gap)?;
        let (min, max) = volume.clip();
        slicer.set_clip(min, max);
        Ok((volume, slicer))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// The scene as last loaded or saved.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }

    pub fn volume(&self) -> &VolumeRaycaster {
        &self.volume
    }

    /// Direct access for property tuning; call [`Session::request_redraw`]
    /// afterwards.
    pub fn volume_mut(&mut self) -> &mut VolumeRaycaster {
        &mut self.volume
    }

    pub fn slicer(&self) -> &Slicer {
        &self.slicer
    }

    /// Direct access for property tuning; call [`Session::request_redraw`]
    /// afterwards.
    pub fn slicer_mut(&mut self) -> &mut Slicer {
        &mut self.slicer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Draws both surfaces at the given quality.
    pub fn draw(&mut self, quality: Quality) {
        let slices = self.slicer.slices();
        self.volume.draw(&mut self.backend, quality, Some(slices));
        self.slicer.draw(&mut self.backend, self.volume.boxes());
    }

    /// Draws a low-quality frame now and schedules the high-quality one.
    pub fn request_redraw(&mut self, now: Instant) {
        if let Some(quality) = self.scheduler.trigger(now, false) {
            self.draw(quality);
        }
    }

    /// Schedules the high-quality frame without an immediate draw.
    pub fn request_delayed_redraw(&mut self, now: Instant) {
        self.scheduler.trigger(now, true);
    }

    /// Draws the pending high-quality frame once its deadline has passed.
    /// Returns whether a frame was drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.scheduler.tick(now) {
            Some(quality) => {
                self.draw(quality);
                true
            }
            None => false,
        }
    }

    /// Resizes the volume canvas.
    pub fn resize(&mut self, width: u32, height: u32, now: Instant) {
        self.volume.resize(width, height);
        self.request_redraw(now);
    }

    /// Routes a pointer event to the viewer on `surface`. Returns whether
    /// anything changed.
    pub fn handle_pointer(&mut self, surface: Surface, event: PointerEvent, now: Instant) -> bool {
        let changed = match (surface, event) {
            (Surface::Volume, PointerEvent::Drag { button, delta, .. }) => self.volume.drag(button, delta),
            (Surface::Volume, PointerEvent::Wheel { spin, modifier, .. }) => {
                self.volume.wheel(spin, modifier);
                true
            }
            (Surface::Volume, PointerEvent::Pinch { distance }) => {
                self.volume.pinch(distance);
                true
            }
            (
                Surface::Slices,
                PointerEvent::Down {
                    button: PointerButton::Primary,
                    position,
                },
            ) => self.slicer.pointer_down(position),
            (
                Surface::Slices,
                PointerEvent::Drag {
                    button: PointerButton::Primary,
                    position,
                    ..
                },
            ) => self.slicer.pointer_drag(position),
            (Surface::Slices, PointerEvent::Wheel { position, spin, .. }) => {
                self.slicer.wheel_at(position, spin)
            }
            _ => false,
        };
        if changed {
            self.request_redraw(now);
        }
        changed
    }

    fn sync_clip(&mut self) {
        let (min, max) = self.volume.clip();
        self.slicer.set_clip(min, max);
    }

    /// Sets the clip sliders in native voxel units on both viewers.
    pub fn set_clip(&mut self, min: Vec3, max: Vec3, now: Instant) {
        self.volume.set_clip(min, max);
        self.sync_clip();
        self.request_redraw(now);
    }

    /// Copies a region box into the clip sliders.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownBox`] for an unknown name.
    pub fn view_into(&mut self, name: &str, now: Instant) -> Result<()> {
        self.volume.view_into(name)?;
        self.sync_clip();
        self.request_redraw(now);
        Ok(())
    }

    /// Copies the clip sliders into a region box.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownBox`] for an unknown name.
    pub fn calibrate_from(&mut self, name: &str, now: Instant) -> Result<()> {
        self.volume.calibrate_from(name)?;
        self.request_redraw(now);
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: RenderPreset, now: Instant) {
        self.volume.apply_preset(preset);
        self.request_redraw(now);
    }

    pub fn apply_view_preset(&mut self, preset: ViewPreset, now: Instant) {
        self.volume.apply_view_preset(preset);
        self.request_redraw(now);
    }

    /// Times low-quality frames and lowers the sample count on a slow
    /// device. `clock` is read once at the start and after every frame.
    pub fn run_speed_test(&mut self, clock: &mut dyn FnMut() -> Instant) -> Option<u32> {
        self.volume.start_speed_test(self.options.speed_test_frames, clock());
        let mut reduced = None;
        while self.volume.speed_test_running() {
            self.volume.draw(&mut self.backend, Quality::Low, Some(self.slicer.slices()));
            reduced = self.volume.speed_test_frame(clock());
        }
        reduced
    }

    /// Fetches a brush atlas at the loaded tier and registers its colours
    /// as labels. Returns the number of labels registered.
    ///
    /// # Errors
    ///
    /// Returns a network error if the fetch fails and a data error if the
    /// image does not match the loaded resolution.
    pub fn import_brush(&mut self, source: &dyn AtlasSource, url: &str) -> Result<usize> {
        let bytes = source.fetch(&self.descriptor.tier().atlas_url(url))?;
        let count = self.slicer.import_brush(&bytes)?;
        self.slicer.set_import_atlas_url(Some(url.to_owned()));
        Ok(count)
    }

    /// PNG of every label's points at their atlas positions.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidImage`] if encoding fails.
    pub fn export_brush(&self) -> Result<Vec<u8>> {
        self.slicer.export_brush()
    }

    /// Current state as a scene.
    ///
    /// Resolution is written at native size and slicer zoom relative to it.
    /// `trigger` tags why the scene was captured; `export_matrix` writes the
    /// model-view matrix instead of translate and rotate.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] if the scene has lost its
    /// object or view.
    pub fn snapshot(&self, trigger: Option<&str>, export_matrix: bool) -> Result<Scene> {
        let mut scene = self.scene.clone();
        let (Some(object), Some(view)) = (scene.objects.first_mut(), scene.views.first_mut()) else {
            return Err(ViewerError::InvalidScene("scene has no object or view".into()));
        };
        self.volume.save_records(object, view, export_matrix);
        object.slices = Some(self.slicer.record());
        object.trigger = trigger.map(str::to_owned);
        if let Some(volume) = object.volume.as_mut() {
            volume.res = Some(self.descriptor.native().to_array());
        }
        Ok(scene)
    }

    /// Serializes the current state, optionally pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be captured or serialized.
    pub fn export_scene(&self, pretty: bool) -> Result<String> {
        self.snapshot(None, false)?.to_json(pretty)
    }

    /// Captures the current state and writes it to the session store.
    ///
    /// A failing store is logged and does not fail the save. Returns the
    /// compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be captured or serialized.
    pub fn save(&mut self, trigger: Option<&str>, export_matrix: bool) -> Result<String> {
        let scene = self.snapshot(trigger, export_matrix)?;
        let json = scene.to_json(false)?;
        match self.store.save(&self.key, &json) {
            Ok(()) => log::info!("saved session '{}'", self.key),
            Err(e) => log::warn!("could not store session '{}': {e}", self.key),
        }
        self.scene = scene;
        Ok(json)
    }

    /// Re-applies the scene as originally loaded and forgets the stored
    /// session.
    ///
    /// A brush atlas named by the original scene is fetched from `source`
    /// again; one imported afterwards is dropped.
    ///
    /// # Errors
    ///
    /// Returns a data error if the original scene no longer builds.
    pub fn reset(&mut self, source: &dyn AtlasSource, now: Instant) -> Result<()> {
        let (volume, slicer) =
            Self::build_viewers(&self.original, &self.options, self.descriptor, self.atlas)?;
        let canvas = self.volume.canvas_size();
        let dropped = self.slicer.properties().import_atlas_url.clone();
        self.volume = volume;
        self.volume.resize(canvas.x, canvas.y);
        self.slicer = slicer;
        self.scene = self.original.clone();

        match self.slicer.properties().import_atlas_url.clone() {
            Some(url) => {
                if let Err(e) = self.import_brush(source, &url) {
                    log::warn!("could not re-import brush atlas '{url}': {e}");
                }
            }
            None => {
                if let Some(url) = dropped {
                    log::info!("reset cleared imported brush atlas '{url}'");
                }
            }
        }

        if let Err(e) = self.store.remove(&self.key) {
            log::warn!("could not clear stored session '{}': {e}", self.key);
        }
        log::info!("reset session '{}'", self.key);
        self.request_redraw(now);
        Ok(())
    }
}
