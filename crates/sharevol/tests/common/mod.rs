//! Shared fixtures: a tiny 8 x 8 x 4 volume in a 16 x 16 atlas.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use sharevol::*;

pub const KEY: &str = "phantom.json";

pub const SCENE: &str = r##"{
    "properties": {"background": "#ffffff"},
    "views": [{"axes": true, "border": true}],
    "objects": [{
        "name": "phantom",
        "volume": {"url": "phantom", "res": [8, 8, 4], "autoscale": false},
        "intersections": [
            {"name": "ROI", "color": [255, 0, 0], "minVertices": [2, 2, 1], "maxVertices": [6, 6, 3]}
        ],
        "slices": {"properties": {"layout": "z"}}
    }]
}"##;

pub const LEGACY_SCENE: &str = r##"{
    "url": "phantom",
    "res": [8, 8, 4],
    "volume": {
        "properties": {"samples": 64, "usecolourmap": true, "Xmin": 0.25, "axes": false},
        "translate": [0, 0, -3],
        "colourmap": {"background": "#000000"}
    },
    "slicer": {"properties": {"layout": "x"}}
}"##;

pub fn png(image: &RgbaImage) -> Vec<u8> {
    sharevol_render::encode_png(image).unwrap()
}

/// Gradient atlas holding the four slices.
pub fn atlas_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(16, 16, |x, y| {
        let v = u8::try_from(x * 16 + y).unwrap_or(u8::MAX);
        Rgba([v, v, v, 255])
    });
    png(&image)
}

/// Brush atlas with two colours.
pub fn labels_png() -> Vec<u8> {
    let mut image = RgbaImage::new(16, 16);
    image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
    image.put_pixel(9, 9, Rgba([0, 0, 255, 255]));
    png(&image)
}

pub fn source() -> MemoryAtlasSource {
    MemoryAtlasSource::new()
        .with("phantom-l", atlas_png())
        .with("labels-l", labels_png())
}

/// A memory store that outlives the session holding it.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemorySessionStore>>);

impl SharedStore {
    pub fn stored(&self, key: &str) -> Option<String> {
        self.0.borrow().load(key).unwrap()
    }
}

impl SessionStore for SharedStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.0.borrow().load(key)
    }

    fn save(&mut self, key: &str, scene: &str) -> Result<()> {
        self.0.borrow_mut().save(key, scene)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.0.borrow_mut().remove(key)
    }
}

/// A store whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenStore;

impl SessionStore for BrokenStore {
    fn load(&self, _key: &str) -> Result<Option<String>> {
        Err(ViewerError::Storage("quota exceeded".into()))
    }

    fn save(&mut self, _key: &str, _scene: &str) -> Result<()> {
        Err(ViewerError::Storage("quota exceeded".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        Err(ViewerError::Storage("quota exceeded".into()))
    }
}

pub fn load_with(
    scene: &str,
    config: SessionConfig,
    store: Box<dyn SessionStore>,
) -> Result<Session<RecordingBackend>> {
    Session::load(
        KEY,
        scene,
        config,
        &FixedCapability(64),
        &source(),
        store,
        RecordingBackend::new(),
    )
}

pub fn load(store: &SharedStore) -> Session<RecordingBackend> {
    load_with(SCENE, SessionConfig::default(), Box::new(store.clone())).unwrap()
}
