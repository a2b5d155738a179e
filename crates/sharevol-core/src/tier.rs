//! Resolution tiers for downscaled atlases.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Downscale factor of the loaded atlas relative to the native data.
///
/// Chosen once at load time from the device texture limit and immutable for
/// the rest of the session. Only the X and Y axes are downscaled; Z slices
/// are always kept at native count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionTier {
    /// Native resolution (`-l` atlas).
    #[default]
    Full,
    /// Half resolution (`-m` atlas).
    Half,
    /// Quarter resolution (`-s` atlas).
    Quarter,
    /// Eighth resolution (`-xs` atlas).
    Eighth,
}

impl ResolutionTier {
    /// All tiers from largest to smallest.
    pub const ALL: [ResolutionTier; 4] = [
        ResolutionTier::Full,
        ResolutionTier::Half,
        ResolutionTier::Quarter,
        ResolutionTier::Eighth,
    ];

    /// Returns the integer downscale factor.
    pub fn factor(self) -> u32 {
        match self {
            ResolutionTier::Full => 1,
            ResolutionTier::Half => 2,
            ResolutionTier::Quarter => 4,
            ResolutionTier::Eighth => 8,
        }
    }

    /// Returns the downscale factor as a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn scale(self) -> f32 {
        self.factor() as f32
    }

    /// Returns the atlas URL suffix for this tier.
    pub fn suffix(self) -> &'static str {
        match self {
            ResolutionTier::Full => "-l",
            ResolutionTier::Half => "-m",
            ResolutionTier::Quarter => "-s",
            ResolutionTier::Eighth => "-xs",
        }
    }

    /// Returns the tier with the given factor, if any.
    pub fn from_factor(factor: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.factor() == factor)
    }

    /// Picks the largest tier whose downscaled atlas fits `max_texture`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::NoRenderingCapability`] for a zero texture
    /// limit and [`ViewerError::AtlasTooLarge`] when even the smallest tier
    /// does not fit.
    pub fn select(native_size: u32, max_texture: u32) -> Result<Self> {
        if max_texture == 0 {
            return Err(ViewerError::NoRenderingCapability(
                "maximum texture size is zero".into(),
            ));
        }
        let native = f64::from(native_size);
        Self::ALL
            .into_iter()
            .find(|t| f64::from(max_texture) >= native / f64::from(t.factor()))
            .ok_or(ViewerError::AtlasTooLarge {
                native: native_size,
                max_texture,
            })
    }

    /// Appends this tier's suffix to an atlas base URL.
    pub fn atlas_url(self, base: &str) -> String {
        format!("{base}{}", self.suffix())
    }
}
