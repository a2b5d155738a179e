//! Region-of-interest boxes.
//!
//! Boxes live in normalized voxel space. Their line geometry is derived
//! data: every bounds mutation goes through [`IntersectionBox::set_bounds`],
//! which rebuilds the vertices and bumps a generation counter so GPU
//! buffers know to re-upload.

use glam::Vec3;

use crate::colour::Colour;
use crate::error::{Result, ViewerError};
use crate::view::Axis;

/// Line-list indices for the 12 edges of a box.
pub const BOX_LINE_INDICES: [u16; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // near face
    4, 5, 5, 6, 6, 7, 7, 4, // far face
    0, 4, 3, 7, 1, 5, 2, 6, // connecting edges
];

/// Eight corner vertices of a box, Z scaled into texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    vertices: [Vec3; 8],
    generation: u64,
}

impl LineGeometry {
    fn build(min: Vec3, max: Vec3, fill_ratio: f32, generation: u64) -> Self {
        let z0 = min.z * fill_ratio;
        let z1 = max.z * fill_ratio;
        Self {
            vertices: [
                Vec3::new(min.x, min.y, z0),
                Vec3::new(max.x, min.y, z0),
                Vec3::new(max.x, max.y, z0),
                Vec3::new(min.x, max.y, z0),
                Vec3::new(min.x, min.y, z1),
                Vec3::new(max.x, min.y, z1),
                Vec3::new(max.x, max.y, z1),
                Vec3::new(min.x, max.y, z1),
            ],
            generation,
        }
    }

    pub fn vertices(&self) -> &[Vec3; 8] {
        &self.vertices
    }

    pub fn indices(&self) -> &'static [u16; 24] {
        &BOX_LINE_INDICES
    }

    /// Incremented on every rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A named axis-aligned box in normalized voxel space.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionBox {
    name: String,
    colour: Colour,
    min: Vec3,
    max: Vec3,
    fill_ratio: f32,
    geometry: LineGeometry,
}

impl IntersectionBox {
    /// Creates a box and builds its geometry.
    pub fn new(name: impl Into<String>, colour: Colour, min: Vec3, max: Vec3, fill_ratio: f32) -> Self {
        Self {
            name: name.into(),
            colour,
            min,
            max,
            fill_ratio,
            geometry: LineGeometry::build(min, max, fill_ratio, 0),
        }
    }

    /// The unit box, used as the volume bounding box.
    pub fn unit(fill_ratio: f32) -> Self {
        Self::new("bounds", Colour::WHITE, Vec3::ZERO, Vec3::ONE, fill_ratio)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn fill_ratio(&self) -> f32 {
        self.fill_ratio
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    /// Replaces the bounds and rebuilds the line geometry.
    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.min = min;
        self.max = max;
        self.rebuild();
    }

    /// Rebuilds the line geometry from the current bounds.
    pub fn rebuild(&mut self) {
        self.geometry = LineGeometry::build(
            self.min,
            self.max,
            self.fill_ratio,
            self.geometry.generation + 1,
        );
    }

    /// Whether the slice at normalized `depth` along `axis` cuts strictly
    /// through the box.
    pub fn crosses(&self, axis: Axis, depth: f32) -> bool {
        let k = axis.index();
        self.min[k] < depth && depth < self.max[k]
    }
}

/// Named boxes in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxSet {
    boxes: Vec<IntersectionBox>,
}

impl BoxSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, b: IntersectionBox) {
        self.boxes.push(b);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntersectionBox> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.boxes.iter().map(IntersectionBox::name).collect()
    }

    /// Looks up a box by name.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownBox`] when no box has that name.
    pub fn get(&self, name: &str) -> Result<&IntersectionBox> {
        self.boxes
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| ViewerError::UnknownBox(name.to_owned()))
    }

    /// Mutable lookup by name.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownBox`] when no box has that name.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut IntersectionBox> {
        self.boxes
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| ViewerError::UnknownBox(name.to_owned()))
    }
}

impl<'a> IntoIterator for &'a BoxSet {
    type Item = &'a IntersectionBox;
    type IntoIter = std::slice::Iter<'a, IntersectionBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_scales_z() {
        let b = IntersectionBox::new(
            "roi",
            Colour::rgb(255, 0, 0),
            Vec3::new(0.1, 0.2, 0.4),
            Vec3::new(0.5, 0.6, 0.8),
            0.5,
        );
        let v = b.geometry().vertices();
        assert_eq!(v[0], Vec3::new(0.1, 0.2, 0.2));
        assert_eq!(v[6], Vec3::new(0.5, 0.6, 0.4));
        assert_eq!(b.geometry().indices().len(), 24);
    }

    #[test]
    fn test_set_bounds_bumps_generation() {
        let mut b = IntersectionBox::unit(1.0);
        let g0 = b.geometry().generation();
        b.set_bounds(Vec3::splat(0.25), Vec3::splat(0.75));
        assert_eq!(b.geometry().generation(), g0 + 1);
        assert_eq!(b.geometry().vertices()[0], Vec3::splat(0.25));
        b.rebuild();
        assert_eq!(b.geometry().generation(), g0 + 2);
    }

    #[test]
    fn test_crosses_is_strict() {
        let b = IntersectionBox::new("a", Colour::WHITE, Vec3::splat(0.2), Vec3::splat(0.6), 1.0);
        assert!(b.crosses(Axis::X, 0.4));
        assert!(!b.crosses(Axis::Y, 0.2));
        assert!(!b.crosses(Axis::Z, 0.7));
    }

    #[test]
    fn test_box_set_lookup() {
        let mut set = BoxSet::new();
        set.push(IntersectionBox::unit(1.0));
        assert!(set.get("bounds").is_ok());
        assert!(matches!(set.get_mut("nope"), Err(ViewerError::UnknownBox(_))));
        assert_eq!(set.names(), ["bounds"]);
    }

    #[test]
    fn test_every_edge_indexed_once() {
        let mut edges: Vec<(u16, u16)> = BOX_LINE_INDICES
            .chunks_exact(2)
            .map(|e| (e[0].min(e[1]), e[0].max(e[1])))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        assert_eq!(edges.len(), 12);
    }
}
