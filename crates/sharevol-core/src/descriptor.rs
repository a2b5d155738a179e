//! Volume resolution and physical scale.

use glam::{UVec3, Vec3};

use crate::tier::ResolutionTier;

/// Default native resolution when a scene omits one.
pub const DEFAULT_RESOLUTION: [u32; 3] = [256, 256, 256];

/// Resolution, scale and tier of the loaded volume.
///
/// Cursor and clip-slider values exposed to the user are in native voxel
/// units; the loaded atlas holds X and Y downscaled by the tier while Z is
/// never downscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeDescriptor {
    native: UVec3,
    scale: Vec3,
    tier: ResolutionTier,
    autoscale: bool,
}

impl VolumeDescriptor {
    /// Creates a descriptor. Zero resolution components are raised to one.
    pub fn new(native: UVec3, scale: Vec3, tier: ResolutionTier, autoscale: bool) -> Self {
        Self {
            native: native.max(UVec3::ONE),
            scale,
            tier,
            autoscale,
        }
    }

    /// Native voxel resolution.
    pub fn native(&self) -> UVec3 {
        self.native
    }

    /// Physical voxel scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Resolution tier of the loaded atlas.
    pub fn tier(&self) -> ResolutionTier {
        self.tier
    }

    /// Whether scaling is normalized to the largest axis.
    pub fn autoscale(&self) -> bool {
        self.autoscale
    }

    /// Resolution of the loaded atlas (X and Y divided by the tier).
    pub fn loaded(&self) -> UVec3 {
        let f = self.tier.factor();
        UVec3::new(
            (self.native.x / f).max(1),
            (self.native.y / f).max(1),
            self.native.z,
        )
    }

    /// Loaded resolution as floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn loaded_f32(&self) -> Vec3 {
        let r = self.loaded();
        Vec3::new(r.x as f32, r.y as f32, r.z as f32)
    }

    /// Native resolution as floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn native_f32(&self) -> Vec3 {
        Vec3::new(self.native.x as f32, self.native.y as f32, self.native.z as f32)
    }

    /// Loaded resolution multiplied by the physical scale.
    pub fn dims(&self) -> Vec3 {
        self.loaded_f32() * self.scale
    }

    /// Bounding-box scaling used by the raycaster.
    ///
    /// With autoscale each axis is divided by the largest loaded resolution;
    /// Z is additionally divided by the tier to match the downscaled X/Y.
    pub fn scaling(&self) -> Vec3 {
        if !self.autoscale {
            return self.scale;
        }
        let res = self.loaded_f32();
        let max = res.max_element();
        Vec3::new(
            res.x / max * self.scale.x,
            res.y / max * self.scale.y,
            res.z / max * self.scale.z / self.tier.scale(),
        )
    }
}
