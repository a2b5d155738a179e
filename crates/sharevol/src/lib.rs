//! sharevol-rs: an interactive viewer for volumetric scan data.
//!
//! A scene pairs a raycast volume with orthogonal slice panes. Slices can be
//! painted with brush labels for segmentation, and named region boxes can be
//! moved into the clip range and calibrated back from it.
//!
//! # Quick Start
//!
//! ```no_run
//! use sharevol::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let scene = std::fs::read_to_string("scan.json")?;
//!     let mut session = Session::load(
//!         "scan.json",
//!         &scene,
//!         SessionConfig::default(),
//!         &GpuCapability,
//!         &FileAtlasSource::new("data"),
//!         Box::new(FileSessionStore::new(".sessions")),
//!         RecordingBackend::new(),
//!     )?;
//!
//!     session.draw(Quality::High);
//!     session.save(None, false)?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Session`] owns one loaded scene and routes input and redraws
//! - [`VolumeRaycaster`] holds camera, transfer function, clip range and
//!   region boxes
//! - [`Slicer`] holds slice cursors, the pane layout and brush labels
//! - [`RenderScheduler`] turns bursts of changes into one final frame
//! - [`AtlasSource`], [`SessionStore`], [`RenderCapability`] and
//!   [`DrawBackend`] are the seams to the host

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Getters and builders return values which don't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod input;
pub mod scheduler;
pub mod session;
pub mod slicer;
pub mod source;
pub mod store;
pub mod volume;

pub use capability::{FixedCapability, GpuCapability, RenderCapability};
pub use input::{PointerButton, PointerEvent, PointerTracker};
pub use scheduler::RenderScheduler;
pub use session::{Session, SessionConfig};
pub use slicer::Slicer;
pub use source::{AtlasSource, FileAtlasSource, MemoryAtlasSource};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use volume::{reduced_samples, RoiMode, SpeedTest, VolumeRaycaster};

// Re-export core types
pub use sharevol_core::{
    AtlasLayout, Axis, BoxSet, Colour, ErrorKind, IntersectionBox, LabelSet, Layout,
    LayoutParams, RenderPreset, ResolutionTier, Result, Scene, SliceView, ViewPreset,
    ViewerError, ViewerOptions, VolumeDescriptor, VolumeProperties,
};

// Re-export render types
pub use sharevol_render::{
    DrawBackend, DrawCall, LineShape, LineSync, OrbitCamera, OverlayCanvas, Quality,
    RecordingBackend, SliceTexture, Surface,
};

pub use glam::{Mat4, Quat, UVec2, UVec3, Vec2, Vec3, Vec4};

/// Installs the `env_logger` logger. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
