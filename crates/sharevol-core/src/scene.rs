//! Scene description: the serialization root loaded from and saved to JSON.
//!
//! Every record keeps unknown keys in a flattened `extra` map so a scene
//! written by a newer viewer survives a load/save cycle. Only the first
//! object and the first view are interpreted.
//!
//! An older single-volume layout (a root `volume` key with a nested
//! `properties` bag) is detected and rewritten into the current shape
//! before use; see [`Scene::parse`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::brush::SavedLabel;
use crate::colour::Colour;
use crate::descriptor::DEFAULT_RESOLUTION;
use crate::error::{Result, ViewerError};

/// Scene root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub properties: SceneProperties,
    /// Colour maps, kept opaque for the palette editor.
    #[serde(default)]
    pub colourmaps: Vec<Value>,
    #[serde(default)]
    pub views: Vec<ViewRecord>,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Global rendering properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nogui: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Camera record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<[f32; 3]>,
    /// Euler angles in degrees (3 values) or an `[x, y, z, w]` quaternion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<[f32; 3]>,
    /// Column-major model-view matrix, written instead of translate/rotate
    /// when a matrix export is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modelview: Option<Vec<f32>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Volume data sub-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res: Option<[u32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<bool>,
    /// Size of the full-resolution atlas used for tier selection.
    #[serde(
        default,
        rename = "originalSize",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_size: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A colour as found in scene files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColourValue {
    Rgb([f32; 3]),
    Rgba([f32; 4]),
    Channels { red: f32, green: f32, blue: f32 },
    Text(String),
}

impl ColourValue {
    /// Resolves to an RGB colour; float components are floored.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] for unparsable text.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_colour(&self) -> Result<Colour> {
        let channel = |v: f32| v.floor().clamp(0.0, 255.0) as u8;
        match self {
            ColourValue::Rgb([r, g, b]) | ColourValue::Rgba([r, g, b, _]) => {
                Ok(Colour::rgb(channel(*r), channel(*g), channel(*b)))
            }
            ColourValue::Channels { red, green, blue } => {
                Ok(Colour::rgb(channel(*red), channel(*green), channel(*blue)))
            }
            ColourValue::Text(s) => Colour::parse(s),
        }
    }
}

impl From<Colour> for ColourValue {
    fn from(c: Colour) -> Self {
        ColourValue::Rgb([f32::from(c.r), f32::from(c.g), f32::from(c.b)])
    }
}

/// Saved region-of-interest box, bounds in native voxel units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionRecord {
    pub name: String,
    pub color: ColourValue,
    #[serde(rename = "minVertices")]
    pub min_vertices: [f32; 3],
    #[serde(rename = "maxVertices")]
    pub max_vertices: [f32; 3],
}

/// Slice viewer properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerProperties {
    pub show: bool,
    #[serde(rename = "X", skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(rename = "Y", skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(rename = "Z", skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
    #[serde(rename = "minX", skip_serializing_if = "Option::is_none")]
    pub min_x: Option<f32>,
    #[serde(rename = "maxX", skip_serializing_if = "Option::is_none")]
    pub max_x: Option<f32>,
    #[serde(rename = "minY", skip_serializing_if = "Option::is_none")]
    pub min_y: Option<f32>,
    #[serde(rename = "maxY", skip_serializing_if = "Option::is_none")]
    pub max_y: Option<f32>,
    #[serde(rename = "minZ", skip_serializing_if = "Option::is_none")]
    pub min_z: Option<f32>,
    #[serde(rename = "maxZ", skip_serializing_if = "Option::is_none")]
    pub max_z: Option<f32>,
    pub brightness: f32,
    pub contrast: f32,
    pub power: f32,
    pub usecolourmap: bool,
    pub layout: String,
    pub zoom: f32,
    #[serde(rename = "enableBrush")]
    pub enable_brush: bool,
    #[serde(rename = "drawRectangles")]
    pub draw_rectangles: bool,
    #[serde(rename = "showBrush")]
    pub show_brush: bool,
    #[serde(rename = "brushTransperency")]
    pub brush_transparency: u8,
    #[serde(rename = "brushColour")]
    pub brush_colour: [u8; 3],
    #[serde(rename = "importAtlasUrl", skip_serializing_if = "Option::is_none")]
    pub import_atlas_url: Option<String>,
}

impl Default for SlicerProperties {
    fn default() -> Self {
        Self {
            show: true,
            x: None,
            y: None,
            z: None,
            min_x: None,
            max_x: None,
            min_y: None,
            max_y: None,
            min_z: None,
            max_z: None,
            brightness: 0.0,
            contrast: 1.0,
            power: 1.0,
            usecolourmap: false,
            layout: "YzX".to_owned(),
            zoom: 1.0,
            enable_brush: true,
            draw_rectangles: true,
            show_brush: true,
            brush_transparency: 255,
            brush_colour: crate::brush::DEFAULT_LABEL_COLOUR,
            import_atlas_url: None,
        }
    }
}

/// Slices sub-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlicesRecord {
    #[serde(default)]
    pub properties: SlicerProperties,
    #[serde(
        default,
        rename = "savedLabels",
        with = "saved_labels",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub saved_labels: Vec<SavedLabel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `savedLabels` is written as an object keyed by label name; a plain list
/// is accepted on read.
mod saved_labels {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Map;

    use crate::brush::SavedLabel;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Keyed(Map<String, serde_json::Value>),
        List(Vec<SavedLabel>),
    }

    pub fn serialize<S: Serializer>(labels: &[SavedLabel], s: S) -> Result<S::Ok, S::Error> {
        let mut map = Map::new();
        for label in labels {
            let value = serde_json::to_value(label).map_err(serde::ser::Error::custom)?;
            map.insert(label.label.clone(), value);
        }
        map.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SavedLabel>, D::Error> {
        match Repr::deserialize(d)? {
            Repr::List(list) => Ok(list),
            Repr::Keyed(map) => map
                .into_iter()
                .map(|(_, v)| serde_json::from_value(v).map_err(serde::de::Error::custom))
                .collect(),
        }
    }
}

/// Renderable object record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isovalue: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isowalls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isoalpha: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isosmooth: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<ColourValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mindensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdensity: Option<f32>,
    /// Index into `colourmaps`; present when the colour map is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colourmap: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tricubicfilter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmin: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xmax: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymin: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymax: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zmin: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zmax: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slices: Option<SlicesRecord>,
    #[serde(default)]
    pub intersections: Vec<IntersectionRecord>,
    /// Why the scene was saved (for example `"roi"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scene {
    /// Parses a scene, migrating the legacy single-volume layout and
    /// filling in default resolution and scale.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Json`] for malformed JSON and
    /// [`ViewerError::InvalidScene`] when no object or view is present.
    pub fn parse(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        let mut scene = if root.get("volume").is_some() {
            log::info!("migrating legacy scene layout");
            migrate_legacy(&root)?
        } else {
            serde_json::from_value(root)?
        };
        scene.apply_defaults();
        scene.validate()?;
        Ok(scene)
    }

    /// Serializes the scene, compact or pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Json`] if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    /// Ensures the first object has a volume record with resolution and scale.
    pub fn apply_defaults(&mut self) {
        if let Some(object) = self.objects.first_mut() {
            let volume = object.volume.get_or_insert_with(VolumeRecord::default);
            volume.res.get_or_insert(DEFAULT_RESOLUTION);
            volume.scale.get_or_insert([1.0, 1.0, 1.0]);
        }
    }

    /// Checks that at least one object and one view exist.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.objects.is_empty() {
            return Err(ViewerError::InvalidScene("scene has no objects".into()));
        }
        if self.views.is_empty() {
            return Err(ViewerError::InvalidScene("scene has no views".into()));
        }
        if self.objects.len() > 1 || self.views.len() > 1 {
            log::debug!(
                "scene has {} objects and {} views; only the first of each is used",
                self.objects.len(),
                self.views.len()
            );
        }
        Ok(())
    }

    /// The interpreted object.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] when there is none.
    pub fn object(&self) -> Result<&ObjectRecord> {
        self.objects
            .first()
            .ok_or_else(|| ViewerError::InvalidScene("scene has no objects".into()))
    }

    /// Mutable access to the interpreted object.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] when there is none.
    pub fn object_mut(&mut self) -> Result<&mut ObjectRecord> {
        self.objects
            .first_mut()
            .ok_or_else(|| ViewerError::InvalidScene("scene has no objects".into()))
    }

    /// The interpreted view.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] when there is none.
    pub fn view(&self) -> Result<&ViewRecord> {
        self.views
            .first()
            .ok_or_else(|| ViewerError::InvalidScene("scene has no views".into()))
    }

    /// Mutable access to the interpreted view.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] when there is none.
    pub fn view_mut(&mut self) -> Result<&mut ViewRecord> {
        self.views
            .first_mut()
            .ok_or_else(|| ViewerError::InvalidScene("scene has no views".into()))
    }

    /// The volume sub-record of the interpreted object.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] when it is missing.
    pub fn volume(&self) -> Result<&VolumeRecord> {
        self.object()?
            .volume
            .as_ref()
            .ok_or_else(|| ViewerError::InvalidScene("object has no volume".into()))
    }
}

fn field<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn migrate_legacy(root: &Value) -> Result<Scene> {
    let volume = root
        .get("volume")
        .ok_or_else(|| ViewerError::InvalidScene("legacy scene without volume".into()))?;
    let empty = Value::Object(Map::new());
    let props = volume.get("properties").unwrap_or(&empty);

    let mut object = ObjectRecord {
        name: Some("volume".into()),
        samples: field(props, "samples"),
        isovalue: field(props, "isovalue"),
        isowalls: field(props, "drawWalls"),
        isoalpha: field(props, "isoalpha"),
        isosmooth: field(props, "isosmooth"),
        colour: field(props, "isocolour"),
        density: field(props, "density"),
        power: field(props, "power"),
        tricubicfilter: field(props, "tricubicFilter"),
        xmin: field(props, "Xmin"),
        xmax: field(props, "Xmax"),
        ymin: field(props, "Ymin"),
        ymax: field(props, "Ymax"),
        zmin: field(props, "Zmin"),
        zmax: field(props, "Zmax"),
        brightness: field(props, "brightness"),
        contrast: field(props, "contrast"),
        volume: Some(VolumeRecord {
            url: field(root, "url"),
            res: field(root, "res"),
            scale: field(root, "scale"),
            ..VolumeRecord::default()
        }),
        slices: field(root, "slicer"),
        ..ObjectRecord::default()
    };
    if field::<bool>(props, "usecolourmap").unwrap_or(false) {
        object.colourmap = Some(0);
    }

    let view = ViewRecord {
        axes: field(props, "axes"),
        border: field(props, "border"),
        translate: field(volume, "translate"),
        rotate: field(volume, "rotate"),
        focus: field(volume, "focus"),
        ..ViewRecord::default()
    };

    let mut properties = SceneProperties {
        nogui: field(root, "nogui"),
        ..SceneProperties::default()
    };
    let mut colourmaps = Vec::new();
    if let Some(Value::Object(map)) = volume.get("colourmap") {
        let mut map = map.clone();
        if let Some(Value::String(bg)) = map.remove("background") {
            properties.background = Some(bg);
        }
        colourmaps.push(Value::Object(map));
    }

    Ok(Scene {
        properties,
        colourmaps,
        views: vec![view],
        objects: vec![object],
        extra: Map::new(),
    })
}
