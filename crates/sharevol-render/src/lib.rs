//! Rendering seam for sharevol-rs.
//!
//! This crate sits between the viewer state and the GPU:
//! - [`DrawBackend`], the per-frame draw call interface, and [`RecordingBackend`]
//! - [`OrbitCamera`] for the raycast view
//! - Uniform records laid out for direct upload
//! - [`OverlayCanvas`] for CPU-rasterized box and brush marks
//! - Atlas image decoding and segmentation atlas encoding
//! - wgpu capability probing and per-box line buffer bookkeeping

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Float/int conversions are pervasive in pixel and voxel math
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod atlas_image;
pub mod backend;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod overlay;
pub mod uniforms;

pub use atlas_image::{decode_atlas, encode_png, rasterize_points, rgba_image};
pub use backend::{
    DrawBackend, DrawCall, LineBufferCache, LineShape, LineSync, Quality, RecordingBackend,
    SliceTexture, Surface,
};
pub use camera::OrbitCamera;
pub use error::{RenderError, RenderResult};
pub use gpu::probe_max_texture_dimension;
pub use overlay::OverlayCanvas;
pub use uniforms::{vec3_padded, LineUniforms, SliceUniforms, VolumeUniforms};

pub use image::RgbaImage;
