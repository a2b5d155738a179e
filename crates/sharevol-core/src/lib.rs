//! Core data model for sharevol-rs.
//!
//! This crate holds everything that does not touch a GPU:
//! - [`AtlasLayout`] for addressing Z slices packed into a 2D atlas image
//! - [`ResolutionTier`] and [`VolumeDescriptor`] for downscaled atlases
//! - [`Layout`] for turning a layout string into positioned [`SliceView`]s
//! - [`LabelSet`] brush labels and [`IntersectionBox`] regions of interest
//! - [`Scene`], the serialized scene description

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Getters and builders return values which don't need must_use
#![allow(clippy::must_use_candidate)]
// Scene records mirror the file format, including field names
#![allow(clippy::struct_field_names)]
#![allow(clippy::module_name_repetitions)]

pub mod atlas;
pub mod brush;
pub mod colour;
pub mod descriptor;
pub mod error;
pub mod intersection;
pub mod layout;
pub mod math;
pub mod options;
pub mod properties;
pub mod scene;
pub mod tier;
pub mod view;

pub use atlas::{AtlasLayout, AtlasVoxel};
pub use brush::{BrushLabel, BrushPalette, CurrentLabel, LabelSet, PaletteStop, SavedLabel};
pub use colour::Colour;
pub use descriptor::VolumeDescriptor;
pub use error::{ErrorKind, Result, ViewerError};
pub use intersection::{BoxSet, IntersectionBox, LineGeometry, BOX_LINE_INDICES};
pub use layout::{Layout, LayoutParams};
pub use math::MatrixStack;
pub use options::{AtlasFilter, ViewerOptions};
pub use properties::{RenderPreset, ViewPreset, VolumeProperties};
pub use scene::{Scene, SlicerProperties};
pub use tier::ResolutionTier;
pub use view::{Axis, Rotation, SliceView, Viewport};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, UVec2, UVec3, Vec2, Vec3, Vec4};
