//! Raycaster render properties, render presets and camera view presets.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Smallest sample count accepted by the raycaster.
pub const MIN_SAMPLES: u32 = 32;
/// Largest sample count accepted by the raycaster.
pub const MAX_SAMPLES: u32 = 1024;

/// Floors `samples` to a multiple of 32 and clamps it to `[32, 1024]`.
pub fn normalize_samples(samples: u32) -> u32 {
    (samples / MIN_SAMPLES * MIN_SAMPLES).clamp(MIN_SAMPLES, MAX_SAMPLES)
}

/// Live render state of the volume raycaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct VolumeProperties {
    pub samples: u32,
    pub isovalue: f32,
    pub isowalls: bool,
    pub isoalpha: f32,
    pub isosmooth: f32,
    pub colour: [u8; 3],
    /// Normalized clip minimum; Z is in texture space.
    pub clip_min: Vec3,
    /// Normalized clip maximum; Z is in texture space.
    pub clip_max: Vec3,
    pub density: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub power: f32,
    pub mindensity: f32,
    pub maxdensity: f32,
    pub usecolourmap: bool,
    pub tricubic_filter: bool,
    pub axes: bool,
    pub border: bool,
    pub interactive: bool,
}

impl Default for VolumeProperties {
    fn default() -> Self {
        Self {
            samples: 256,
            isovalue: 0.0,
            isowalls: false,
            isoalpha: 0.75,
            isosmooth: 1.0,
            colour: [214, 188, 86],
            clip_min: Vec3::ZERO,
            clip_max: Vec3::ONE,
            density: 10.0,
            saturation: 1.0,
            brightness: 0.0,
            contrast: 1.0,
            power: 1.0,
            mindensity: 0.0,
            maxdensity: 1.0,
            usecolourmap: false,
            tricubic_filter: false,
            axes: true,
            border: true,
            interactive: true,
        }
    }
}

/// Named render mode overwriting the transfer-function properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPreset {
    /// Dense, desaturated X-ray look.
    XRay,
    /// Isosurface-driven anatomic look.
    Anatomic,
}

impl RenderPreset {
    /// Overwrites the nine preset-controlled properties and nothing else.
    pub fn apply(self, props: &mut VolumeProperties) {
        match self {
            RenderPreset::XRay => {
                props.brightness = 0.0;
                props.contrast = 1.1;
                props.density = 25.0;
                props.isovalue = 0.0;
                props.maxdensity = 1.0;
                props.mindensity = 0.35;
                props.power = 5.0;
                props.samples = 1024;
                props.saturation = 0.0;
            }
            RenderPreset::Anatomic => {
                props.brightness = -0.117_808_9;
                props.contrast = 1.0;
                props.density = 5.0;
                props.isovalue = 0.45;
                props.maxdensity = 1.0;
                props.mindensity = 0.0;
                props.power = 1.0;
                props.samples = 256;
                props.saturation = 1.0;
            }
        }
    }
}

/// Fixed camera orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewPreset {
    Top,
    Bottom,
    Front,
    Right,
    Left,
}

impl ViewPreset {
    /// Orientation quaternion for this preset.
    pub fn rotation(self) -> Quat {
        let ir2 = std::f32::consts::FRAC_1_SQRT_2;
        let ir4 = 0.5;
        match self {
            ViewPreset::Top => Quat::from_xyzw(0.0, 0.0, 1.0, 0.0),
            ViewPreset::Bottom => Quat::from_xyzw(1.0, 0.0, 0.0, 0.0),
            ViewPreset::Front => Quat::from_xyzw(ir2, 0.0, 0.0, -ir2),
            ViewPreset::Right => Quat::from_xyzw(ir4, ir4, ir4, -ir4),
            ViewPreset::Left => Quat::from_xyzw(ir4, -ir4, -ir4, -ir4),
        }
    }

    /// Parses a preset name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "top" => Some(ViewPreset::Top),
            "bottom" => Some(ViewPreset::Bottom),
            "front" => Some(ViewPreset::Front),
            "right" => Some(ViewPreset::Right),
            "left" => Some(ViewPreset::Left),
            _ => None,
        }
    }
}
