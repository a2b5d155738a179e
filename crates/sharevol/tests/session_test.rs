//! Session lifecycle: loading, persistence, reset, brush import and export,
//! redraw scheduling and the speed test.

mod common;

use std::time::{Duration, Instant};

use common::*;
use sharevol::*;

#[test]
fn test_load_uploads_atlas_and_builds_viewers() {
    let store = SharedStore::default();
    let session = load(&store);

    assert_eq!(session.key(), KEY);
    assert_eq!(session.descriptor().tier(), ResolutionTier::Full);
    assert_eq!(session.descriptor().native(), UVec3::new(8, 8, 4));
    assert_eq!(session.atlas().capacity(), 4);
    assert_eq!(session.backend().uploads(SliceTexture::Atlas), 1);

    let volume = session.volume();
    assert_eq!(volume.boxes().len(), 1);
    assert_eq!(volume.background().to_rgb(), [255, 255, 255]);
    assert!(volume.properties().axes);
    assert_eq!(volume.clip(), (Vec3::ONE, Vec3::new(8.0, 8.0, 4.0)));

    assert_eq!(session.slicer().layout().views().len(), 1);
    assert_eq!(session.slicer().cursor(), UVec3::new(4, 4, 2));
    assert_eq!(session.slicer().clip(), session.volume().clip());
}

#[test]
fn test_draw_renders_both_surfaces() {
    let store = SharedStore::default();
    let mut session = load(&store);
    session.draw(Quality::High);

    let backend = session.backend();
    assert_eq!(backend.frames(Surface::Volume), 1);
    assert_eq!(backend.frames(Surface::Slices), 1);
    assert_eq!(backend.volume_passes(Quality::High), 1);
    assert_eq!(backend.volume_passes(Quality::Low), 0);
}

#[test]
fn test_load_errors_are_classified() {
    let missing_atlas = Session::load(
        KEY,
        SCENE,
        SessionConfig::default(),
        &FixedCapability(64),
        &MemoryAtlasSource::new(),
        Box::new(MemorySessionStore::new()),
        RecordingBackend::new(),
    )
    .unwrap_err();
    assert_eq!(missing_atlas.kind(), ErrorKind::Network);

    let no_gpu = Session::load(
        KEY,
        SCENE,
        SessionConfig::default(),
        &FixedCapability(0),
        &source(),
        Box::new(MemorySessionStore::new()),
        RecordingBackend::new(),
    )
    .unwrap_err();
    assert_eq!(no_gpu.kind(), ErrorKind::Capability);

    let huge = SCENE.replace(r#""autoscale": false"#, r#""autoscale": false, "originalSize": 100000"#);
    let too_large = load_with(&huge, SessionConfig::default(), Box::new(MemorySessionStore::new())).unwrap_err();
    assert!(matches!(too_large, ViewerError::AtlasTooLarge { .. }));

    // nine slices do not fit a 2 x 2 tile atlas
    let deep = SCENE.replace("[8, 8, 4]", "[8, 8, 9]");
    let malformed = load_with(&deep, SessionConfig::default(), Box::new(MemorySessionStore::new())).unwrap_err();
    assert!(matches!(malformed, ViewerError::MalformedAtlas { .. }));

    let no_url = SCENE.replace(r#""url": "phantom", "#, "");
    let invalid = load_with(&no_url, SessionConfig::default(), Box::new(MemorySessionStore::new())).unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::Data);
}

#[test]
fn test_save_and_restore() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);
    session.set_clip(Vec3::new(2.0, 3.0, 1.0), Vec3::new(6.0, 7.0, 3.0), now);
    session.slicer_mut().set_cursor(Axis::Z, 3);
    session.volume_mut().set_samples(512);

    let json = session.save(Some("roi"), false).unwrap();
    assert!(json.contains(r#""trigger":"roi""#));
    assert_eq!(store.stored(KEY).as_deref(), Some(json.as_str()));

    let restored = load(&store);
    let (min, max) = restored.volume().clip();
    assert!((min - Vec3::new(2.0, 3.0, 1.0)).abs().max_element() < 1e-4);
    assert!((max - Vec3::new(6.0, 7.0, 3.0)).abs().max_element() < 1e-4);
    assert_eq!(restored.volume().properties().samples, 512);
    assert_eq!(restored.slicer().cursor().z, 3);
    assert_eq!(restored.descriptor().native(), UVec3::new(8, 8, 4));
}

#[test]
fn test_reset_config_ignores_stored_session() {
    let store = SharedStore::default();
    let mut session = load(&store);
    session.set_clip(Vec3::splat(2.0), Vec3::splat(3.0), Instant::now());
    session.save(None, false).unwrap();

    let config = SessionConfig {
        reset: true,
        ..SessionConfig::default()
    };
    let fresh = load_with(SCENE, config, Box::new(store.clone())).unwrap();
    assert_eq!(fresh.volume().clip().0, Vec3::ONE);
    assert_eq!(store.stored(KEY), None);
}

#[test]
fn test_reset_restores_original_scene() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);
    session.resize(320, 240, now);
    session.view_into("ROI", now).unwrap();
    session.save(None, false).unwrap();

    session.reset(&source(), now).unwrap();
    assert_eq!(session.volume().clip(), (Vec3::ONE, Vec3::new(8.0, 8.0, 4.0)));
    assert_eq!(session.slicer().clip(), session.volume().clip());
    assert_eq!(session.volume().current_box(), None);
    assert_eq!(session.volume().canvas_size(), UVec2::new(320, 240));
    assert_eq!(store.stored(KEY), None);
}

#[test]
fn test_corrupt_stored_session_is_discarded() {
    let store = SharedStore::default();
    store.0.borrow_mut().save(KEY, "{not json").unwrap();

    let session = load(&store);
    assert_eq!(session.volume().boxes().len(), 1);
    assert_eq!(store.stored(KEY), None);
}

#[test]
fn test_broken_store_does_not_fail() {
    let mut session = load_with(SCENE, SessionConfig::default(), Box::new(BrokenStore)).unwrap();
    let json = session.save(None, true).unwrap();
    assert!(json.contains("modelview"));
    assert!(session.reset(&source(), Instant::now()).is_ok());
}

#[test]
fn test_legacy_scene_loads() {
    let store = SharedStore::default();
    let session = load_with(LEGACY_SCENE, SessionConfig::default(), Box::new(store)).unwrap();

    let volume = session.volume();
    assert_eq!(volume.properties().samples, 64);
    assert!(volume.properties().usecolourmap);
    assert!(!volume.properties().axes);
    assert_eq!(volume.clip().0.x, 2.0);
    assert_eq!(volume.canvas_background(), volume.background());
    assert_eq!(volume.background().to_rgb(), [0, 0, 0]);
    assert_eq!(session.slicer().layout().views()[0].axis(), Axis::X);

    // saving writes the modern layout
    let exported = session.export_scene(false).unwrap();
    let reparsed = Scene::parse(&exported).unwrap();
    assert_eq!(reparsed.volume().unwrap().url.as_deref(), Some("phantom"));
    assert_eq!(reparsed.object().unwrap().colourmap, Some(0));
}

#[test]
fn test_view_into_syncs_slicer_clip() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);

    session.view_into("ROI", now).unwrap();
    let expected = (Vec3::new(2.0, 2.0, 1.0), Vec3::new(6.0, 6.0, 3.0));
    assert_eq!(session.volume().clip(), expected);
    assert_eq!(session.slicer().clip(), expected);
    assert_eq!(session.volume().roi_mode(), Some(RoiMode::Viewing));

    let err = session.view_into("missing", now).unwrap_err();
    assert!(matches!(err, ViewerError::UnknownBox(_)));
    assert_eq!(session.slicer().clip(), expected);
}

#[test]
fn test_calibrated_box_is_saved() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);
    session.set_clip(Vec3::new(1.0, 2.0, 1.0), Vec3::new(4.0, 5.0, 2.0), now);
    session.calibrate_from("ROI", now).unwrap();
    session.save(Some("roi"), false).unwrap();

    let mut restored = load(&store);
    restored.view_into("ROI", now).unwrap();
    let (min, max) = restored.volume().clip();
    assert!((min - Vec3::new(1.0, 2.0, 1.0)).abs().max_element() < 1e-4);
    assert!((max - Vec3::new(4.0, 5.0, 2.0)).abs().max_element() < 1e-4);
}

#[test]
fn test_calibration_rewrites_box_buffer_in_place() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);
    session.draw(Quality::High);
    let created = session.backend().line_writes();
    // bounds first, then the ROI box
    assert_eq!(
        created,
        vec![LineSync::Created { handle: 0 }, LineSync::Created { handle: 1 }]
    );

    session.backend_mut().clear();
    session.draw(Quality::High);
    assert!(session.backend().line_writes().is_empty());

    session.set_clip(Vec3::new(1.0, 2.0, 1.0), Vec3::new(4.0, 5.0, 2.0), now);
    session.calibrate_from("ROI", now).unwrap();
    session.backend_mut().clear();
    session.draw(Quality::High);
    assert_eq!(session.backend().line_writes(), vec![LineSync::Rewritten { handle: 1 }]);
    assert_eq!(session.backend().line_buffers().len(), 2);
}

#[test]
fn test_painting_and_export() {
    let store = SharedStore::default();
    let mut session = load(&store);
    let down = PointerEvent::Down {
        button: PointerButton::Primary,
        position: Vec2::new(4.0, 9.0),
    };
    assert!(session.handle_pointer(Surface::Slices, down, Instant::now()));
    assert_eq!(session.slicer().labels().current().points().len(), 1);

    let image = sharevol_render::decode_atlas(&session.export_brush().unwrap()).unwrap();
    assert_eq!(image.dimensions(), (16, 16));
    // slice 2 sits in tile (0, 1)
    assert_eq!(image.get_pixel(4, 12).0[3], 255);
    assert_eq!(image.pixels().filter(|p| p.0[3] != 0).count(), 1);

    // a click outside every pane changes nothing
    let miss = PointerEvent::Down {
        button: PointerButton::Primary,
        position: Vec2::new(4.0, 2.0),
    };
    assert!(!session.handle_pointer(Surface::Slices, miss, Instant::now()));
}

#[test]
fn test_brush_import_is_restored_with_session() {
    let store = SharedStore::default();
    let mut session = load(&store);
    let source = source();

    assert_eq!(session.import_brush(&source, "labels").unwrap(), 2);
    assert!(session.slicer().has_brush_atlas());
    assert_eq!(session.slicer().properties().import_atlas_url.as_deref(), Some("labels"));
    session.draw(Quality::High);
    assert_eq!(session.backend().uploads(SliceTexture::Brush), 1);
    session.save(None, false).unwrap();

    let restored = load(&store);
    assert!(restored.slicer().has_brush_atlas());
    assert!(restored.slicer().labels().names().contains(&"2"));

    let bad = MemoryAtlasSource::new().with("bad-l", png(&image::RgbaImage::new(12, 16)));
    let err = session.import_brush(&bad, "bad").unwrap_err();
    assert!(matches!(err, ViewerError::MalformedAtlas { .. }));
    assert_eq!(session.import_brush(&bad, "gone").unwrap_err().kind(), ErrorKind::Network);
    assert_eq!(session.slicer().properties().import_atlas_url.as_deref(), Some("labels"));
}

#[test]
fn test_reset_drops_brush_imported_later() {
    let store = SharedStore::default();
    let now = Instant::now();
    let mut session = load(&store);
    let source = source();
    session.import_brush(&source, "labels").unwrap();
    assert!(session.slicer().has_brush_atlas());

    session.reset(&source, now).unwrap();
    assert!(!session.slicer().has_brush_atlas());
    assert_eq!(session.slicer().properties().import_atlas_url, None);
    assert!(!session.slicer().labels().names().contains(&"2"));
}

#[test]
fn test_reset_reimports_brush_from_original_scene() {
    let store = SharedStore::default();
    let now = Instant::now();
    let scene = SCENE.replace(
        r#""layout": "z""#,
        r#""layout": "z", "importAtlasUrl": "labels""#,
    );
    let mut session = load_with(&scene, SessionConfig::default(), Box::new(store.clone())).unwrap();
    assert!(session.slicer().has_brush_atlas());
    session.draw(Quality::High);
    assert_eq!(session.backend().uploads(SliceTexture::Brush), 1);

    session.reset(&source(), now).unwrap();
    assert!(session.slicer().has_brush_atlas());
    assert_eq!(session.slicer().properties().import_atlas_url.as_deref(), Some("labels"));
    assert!(session.slicer().labels().names().contains(&"2"));
    session.draw(Quality::High);
    assert_eq!(session.backend().uploads(SliceTexture::Brush), 2);

    // a failed re-import is logged and the reset still succeeds
    let offline = MemoryAtlasSource::new().with("phantom-l", atlas_png());
    session.reset(&offline, now).unwrap();
    assert!(!session.slicer().has_brush_atlas());
}

#[test]
fn test_interaction_burst_ends_in_one_high_quality_frame() {
    let store = SharedStore::default();
    let mut session = load(&store);
    let t0 = Instant::now();
    let wheel = PointerEvent::Wheel {
        position: Vec2::ZERO,
        spin: 1.0,
        modifier: false,
    };
    for ms in [0, 100, 200] {
        assert!(session.handle_pointer(Surface::Volume, wheel, t0 + Duration::from_millis(ms)));
    }
    assert_eq!(session.backend().volume_passes(Quality::Low), 3);

    assert!(!session.tick(t0 + Duration::from_millis(300)));
    assert!(session.tick(t0 + Duration::from_millis(450)));
    assert!(!session.tick(t0 + Duration::from_millis(900)));
    assert_eq!(session.backend().volume_passes(Quality::High), 1);

    session.request_delayed_redraw(t0 + Duration::from_secs(1));
    assert_eq!(session.backend().volume_passes(Quality::Low), 3);
    assert!(session.scheduler().is_pending());
}

#[test]
fn test_low_power_session() {
    let store = SharedStore::default();
    let config = SessionConfig {
        options: ViewerOptions::low_power(),
        reset: false,
    };
    let mut session = load_with(SCENE, config, Box::new(store)).unwrap();
    assert!(!session.slicer().properties().show);
    assert!(!session.volume().properties().interactive);

    session.draw(Quality::Low);
    assert_eq!(session.backend().volume_passes(Quality::Low), 0);
    assert_eq!(session.backend().frames(Surface::Slices), 0);
    session.draw(Quality::High);
    assert_eq!(session.backend().volume_passes(Quality::High), 1);
}

fn stepping_clock(step: Duration) -> impl FnMut() -> Instant {
    let start = Instant::now();
    let mut calls = 0;
    move || {
        let now = start + step * calls;
        calls += 1;
        now
    }
}

#[test]
fn test_speed_test_reduces_samples_on_slow_device() {
    let store = SharedStore::default();
    let mut session = load(&store);
    assert_eq!(session.volume().properties().samples, 256);

    // five frames at 500 ms each
    let mut clock = stepping_clock(Duration::from_millis(500));
    assert_eq!(session.run_speed_test(&mut clock), Some(102));
    assert_eq!(session.volume().properties().samples, 102);
    assert_eq!(session.backend().volume_passes(Quality::Low), 5);
}

#[test]
fn test_speed_test_keeps_samples_on_fast_device() {
    let store = SharedStore::default();
    let mut session = load(&store);
    let mut clock = stepping_clock(Duration::from_millis(100));
    assert_eq!(session.run_speed_test(&mut clock), None);
    assert_eq!(session.volume().properties().samples, 256);
}
