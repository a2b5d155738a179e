//! Brush labels for manual segmentation.
//!
//! Every label owns a colour and the list of points painted with it. Points
//! are stored in normalized voxel coordinates so they survive tier changes.
//! One label is current at any time: either a saved label, or a draft
//! created by [`LabelSet::new_label`] that only joins the saved set once
//! [`LabelSet::save_label`] is called.

use glam::{UVec2, UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::atlas::AtlasLayout;
use crate::colour::Colour;
use crate::error::{Result, ViewerError};

/// Name of the label every session starts with.
pub const DEFAULT_LABEL_NAME: &str = "orange";
/// Colour of the default label.
pub const DEFAULT_LABEL_COLOUR: [u8; 3] = [214, 188, 86];

/// A named paint colour with its painted points.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushLabel {
    name: String,
    colour: [u8; 3],
    points: Vec<Vec3>,
}

impl BrushLabel {
    /// Creates an empty label.
    pub fn new(name: impl Into<String>, colour: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            colour,
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour(&self) -> [u8; 3] {
        self.colour
    }

    /// Painted points in normalized voxel coordinates.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Appends a painted point.
    pub fn paint(&mut self, point: Vec3) {
        self.points.push(point);
    }
}

/// Label record as stored in a scene file (`savedLabels`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLabel {
    pub label: String,
    pub color: [u8; 3],
}

/// Which label receives new paint.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentLabel {
    /// Index into the saved labels.
    Saved(usize),
    /// An unsaved label.
    Draft(BrushLabel),
}

/// A colour stop of the brush palette.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteStop {
    pub position: f32,
    pub colour: Colour,
    /// Label this stop was registered for; `None` for the transparent base stop.
    pub label: Option<String>,
}

/// Gradient used to colour the imported brush texture.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushPalette {
    stops: Vec<PaletteStop>,
}

impl Default for BrushPalette {
    fn default() -> Self {
        Self {
            stops: vec![PaletteStop {
                position: 0.0,
                colour: Colour::rgba(0, 0, 0, 0),
                label: None,
            }],
        }
    }
}

impl BrushPalette {
    /// Colour stops in ascending position.
    pub fn stops(&self) -> &[PaletteStop] {
        &self.stops
    }

    /// Appends a stop for `label` and respaces every stop evenly.
    pub fn push(&mut self, label: &str, colour: Colour) {
        self.stops.push(PaletteStop {
            position: 0.0,
            colour,
            label: Some(label.to_owned()),
        });
        self.respace();
    }

    /// Recolours the stop registered for `label`, if any.
    pub fn recolour(&mut self, label: &str, colour: Colour) -> bool {
        match self.stops.iter_mut().find(|s| s.label.as_deref() == Some(label)) {
            Some(stop) => {
                stop.colour = colour;
                true
            }
            None => false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn respace(&mut self) {
        let len = self.stops.len() as f32;
        for (i, stop) in self.stops.iter_mut().enumerate().skip(1) {
            stop.position = i as f32 / len;
        }
    }

    /// Samples the palette into a `width` x 1 RGBA strip for upload as a
    /// lookup texture. Stops are step-interpolated.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rgba_strip(&self, width: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(width as usize * 4);
        for x in 0..width {
            let t = x as f32 / width.max(1) as f32;
            let colour = self
                .stops
                .iter()
                .rev()
                .find(|s| s.position <= t)
                .map_or(Colour::rgba(0, 0, 0, 0), |s| s.colour);
            out.extend_from_slice(&[colour.r, colour.g, colour.b, colour.a]);
        }
        out
    }
}

/// Saved labels, the current label and the brush palette.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    saved: Vec<BrushLabel>,
    current: CurrentLabel,
    palette: BrushPalette,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelSet {
    /// Creates a set holding only the default label, which is current.
    pub fn new() -> Self {
        Self {
            saved: vec![BrushLabel::new(DEFAULT_LABEL_NAME, DEFAULT_LABEL_COLOUR)],
            current: CurrentLabel::Saved(0),
            palette: BrushPalette::default(),
        }
    }

    /// Saved labels in insertion order.
    pub fn saved(&self) -> &[BrushLabel] {
        &self.saved
    }

    /// Names of the saved labels.
    pub fn names(&self) -> Vec<&str> {
        self.saved.iter().map(BrushLabel::name).collect()
    }

    /// The label receiving new paint.
    pub fn current(&self) -> &BrushLabel {
        match &self.current {
            CurrentLabel::Saved(idx) => &self.saved[*idx],
            CurrentLabel::Draft(label) => label,
        }
    }

    fn current_mut(&mut self) -> &mut BrushLabel {
        match &mut self.current {
            CurrentLabel::Saved(idx) => &mut self.saved[*idx],
            CurrentLabel::Draft(label) => label,
        }
    }

    /// Whether the current label is an unsaved draft.
    pub fn has_draft(&self) -> bool {
        matches!(self.current, CurrentLabel::Draft(_))
    }

    /// Brush palette for the imported brush texture.
    pub fn palette(&self) -> &BrushPalette {
        &self.palette
    }

    /// Every label to draw or export: saved labels followed by the draft.
    pub fn drawable(&self) -> impl Iterator<Item = &BrushLabel> {
        let draft = match &self.current {
            CurrentLabel::Draft(label) => Some(label),
            CurrentLabel::Saved(_) => None,
        };
        self.saved.iter().chain(draft)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.saved.iter().position(|l| l.name == name)
    }

    fn discard_draft(&mut self) {
        if let CurrentLabel::Draft(draft) = &self.current {
            if !draft.points.is_empty() {
                log::warn!(
                    "discarding unsaved label '{}' with {} points",
                    draft.name,
                    draft.points.len()
                );
            }
        }
    }

    /// Starts a new unsaved label and makes it current.
    pub fn new_label(&mut self, name: impl Into<String>, colour: [u8; 3]) {
        self.discard_draft();
        self.current = CurrentLabel::Draft(BrushLabel::new(name, colour));
    }

    /// Renames the current draft. Returns `false` when no draft exists.
    pub fn rename_draft(&mut self, name: impl Into<String>) -> bool {
        match &mut self.current {
            CurrentLabel::Draft(label) => {
                label.name = name.into();
                true
            }
            CurrentLabel::Saved(_) => false,
        }
    }

    /// Stores the draft under its name, replacing a saved label with the
    /// same name, and makes it current. Saving a saved label is a no-op.
    pub fn save_label(&mut self) {
        let current = std::mem::replace(&mut self.current, CurrentLabel::Saved(0));
        self.current = match current {
            CurrentLabel::Draft(label) => CurrentLabel::Saved(self.insert(label)),
            saved @ CurrentLabel::Saved(_) => saved,
        };
        log::info!("saved label '{}'", self.current().name);
    }

    fn insert(&mut self, label: BrushLabel) -> usize {
        match self.position(&label.name) {
            Some(idx) => {
                self.saved[idx] = label;
                idx
            }
            None => {
                self.saved.push(label);
                self.saved.len() - 1
            }
        }
    }

    /// Makes a saved label current, discarding any draft.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownLabel`] if no saved label has that name.
    pub fn select_label(&mut self, name: &str) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| ViewerError::UnknownLabel(name.to_owned()))?;
        self.discard_draft();
        self.current = CurrentLabel::Saved(idx);
        Ok(())
    }

    /// Recolours the current label and its palette stop.
    pub fn set_current_colour(&mut self, colour: [u8; 3]) {
        let label = self.current_mut();
        label.colour = colour;
        let name = label.name.clone();
        self.palette.recolour(&name, Colour::from(colour));
    }

    /// Paints a normalized point with the current label.
    pub fn paint(&mut self, point: Vec3) {
        self.current_mut().paint(point);
    }

    /// Registers a label for an imported colour, replacing any saved label
    /// of the same name, and adds a palette stop for it.
    pub fn register_imported(&mut self, name: &str, colour: [u8; 3]) {
        self.insert(BrushLabel::new(name, colour));
        self.palette.push(name, Colour::from(colour));
        log::info!("registered imported label '{name}' {colour:?}");
    }

    /// Saved labels as scene records. Drafts are not persisted.
    pub fn to_saved(&self) -> Vec<SavedLabel> {
        self.saved
            .iter()
            .map(|l| SavedLabel {
                label: l.name.clone(),
                color: l.colour,
            })
            .collect()
    }

    /// Replaces the saved labels with scene records. An empty list keeps
    /// the current labels.
    pub fn load_saved(&mut self, records: &[SavedLabel]) {
        if records.is_empty() {
            return;
        }
        self.saved = records
            .iter()
            .map(|r| BrushLabel::new(r.label.clone(), r.color))
            .collect();
        self.current = CurrentLabel::Saved(0);
    }

    /// Atlas pixels for every drawable point: one pixel per point at its
    /// atlas-mapped position, coloured with the label's RGB.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn atlas_pixels(&self, layout: &AtlasLayout, loaded_res: UVec3) -> Vec<(UVec2, [u8; 3])> {
        let res = Vec3::new(loaded_res.x as f32, loaded_res.y as f32, loaded_res.z as f32);
        let clamp = |v: f32, max: u32| (v.round().max(0.0) as u32).min(max.saturating_sub(1));
        let mut pixels = Vec::new();
        for label in self.drawable() {
            for p in &label.points {
                let z = clamp(p.z * res.z, loaded_res.z);
                let x = clamp(p.x * res.x, loaded_res.x);
                let y = clamp(p.y * res.y, loaded_res.y);
                let px = layout.pixel_of(x, y, z);
                if px.x < layout.width() && px.y < layout.height() {
                    pixels.push((px, label.colour));
                }
            }
        }
        pixels
    }
}

/// Scans RGBA pixels of an imported brush atlas and returns the distinct
/// non-black colours in first-seen order.
pub fn distinct_colours(rgba: &[u8]) -> Vec<[u8; 3]> {
    let mut seen = std::collections::HashSet::new();
    let mut colours = Vec::new();
    for px in rgba.chunks_exact(4) {
        let rgb = [px[0], px[1], px[2]];
        if rgb != [0, 0, 0] && seen.insert(rgb) {
            colours.push(rgb);
        }
    }
    colours
}
