//! Tiled atlas addressing.
//!
//! A volume is shipped as a single 2D image that packs every Z slice as a
//! tile in a row-major grid. [`AtlasLayout`] converts between slice indices
//! and pixel positions inside that image. The slice renderer, the brush
//! importer and the brush exporter all go through the same two functions
//! ([`AtlasLayout::pixel_offset`] and [`AtlasLayout::locate`]) so the
//! mappings cannot drift apart.

use glam::UVec2;

use crate::error::{Result, ViewerError};

/// A pixel of the atlas resolved to its voxel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasVoxel {
    /// Column inside the slice tile.
    pub x: u32,
    /// Row inside the slice tile.
    pub y: u32,
    /// Slice index.
    pub z: u32,
}

/// Tile grid of a loaded atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
}

impl AtlasLayout {
    /// Computes the tile grid for an image of `width` x `height` pixels
    /// holding slices of `res_x` x `res_y` voxels.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::MalformedAtlas`] when the image is empty or its
    /// dimensions are not exact multiples of the slice size.
    pub fn new(width: u32, height: u32, res_x: u32, res_y: u32) -> Result<Self> {
        let malformed = || ViewerError::MalformedAtlas {
            width,
            height,
            res_x,
            res_y,
        };
        if res_x == 0 || res_y == 0 || width == 0 || height == 0 {
            return Err(malformed());
        }
        if width % res_x != 0 || height % res_y != 0 {
            return Err(malformed());
        }
        Ok(Self {
            width,
            height,
            tile_width: res_x,
            tile_height: res_y,
            columns: width / res_x,
            rows: height / res_y,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Slice width in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Slice height in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile grid as floats, as handed to shaders.
    #[allow(clippy::cast_precision_loss)]
    pub fn tiles(&self) -> [f32; 2] {
        [self.columns as f32, self.rows as f32]
    }

    /// Total number of tiles in the image.
    pub fn capacity(&self) -> u32 {
        self.columns * self.rows
    }

    /// Fraction of the tile grid occupied by `depth` slices.
    ///
    /// Texture-space Z coordinates are scaled by this ratio because unused
    /// trailing tiles still count towards the normalized texture depth.
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self, depth: u32) -> f32 {
        depth as f32 / self.capacity() as f32
    }

    /// Tile coordinates (column, row) of slice `z`.
    pub fn tile_of(&self, z: u32) -> UVec2 {
        UVec2::new(z % self.columns, z / self.columns)
    }

    /// Top-left pixel of slice `z`.
    pub fn pixel_offset(&self, z: u32) -> UVec2 {
        self.tile_of(z) * UVec2::new(self.tile_width, self.tile_height)
    }

    /// Pixel holding voxel (`x`, `y`) of slice `z`.
    pub fn pixel_of(&self, x: u32, y: u32, z: u32) -> UVec2 {
        self.pixel_offset(z) + UVec2::new(x, y)
    }

    /// Slice index of the tile containing pixel (`px`, `py`).
    pub fn z_of_pixel(&self, px: u32, py: u32) -> u32 {
        let row = py / self.tile_height;
        let col = px / self.tile_width;
        row * self.columns + col
    }

    /// Resolves pixel (`px`, `py`) to its voxel position.
    ///
    /// Returns `None` for pixels outside the image.
    pub fn locate(&self, px: u32, py: u32) -> Option<AtlasVoxel> {
        if px >= self.width || py >= self.height {
            return None;
        }
        Some(AtlasVoxel {
            x: px % self.tile_width,
            y: py % self.tile_height,
            z: self.z_of_pixel(px, py),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::ResolutionTier;
    use proptest::prelude::*;

    #[test]
    fn test_grid() {
        let layout = AtlasLayout::new(4096, 4096, 256, 256).unwrap();
        assert_eq!(layout.columns(), 16);
        assert_eq!(layout.rows(), 16);
        assert_eq!(layout.capacity(), 256);
        assert_eq!(layout.tiles(), [16.0, 16.0]);
    }

    #[test]
    fn test_rejects_fractional_grid() {
        assert!(matches!(
            AtlasLayout::new(1000, 1024, 256, 256),
            Err(ViewerError::MalformedAtlas { .. })
        ));
        assert!(AtlasLayout::new(1024, 1024, 0, 256).is_err());
    }

    #[test]
    fn test_offsets() {
        let layout = AtlasLayout::new(1024, 512, 256, 128).unwrap();
        assert_eq!(layout.tile_of(5), UVec2::new(1, 1));
        assert_eq!(layout.pixel_offset(5), UVec2::new(256, 128));
        assert_eq!(layout.pixel_of(3, 4, 5), UVec2::new(259, 132));
        let voxel = layout.locate(259, 132).unwrap();
        assert_eq!(voxel, AtlasVoxel { x: 3, y: 4, z: 5 });
        assert!(layout.locate(1024, 0).is_none());
    }

    #[test]
    fn test_fill_ratio() {
        let layout = AtlasLayout::new(1024, 1024, 256, 256).unwrap();
        assert!((layout.fill_ratio(12) - 0.75).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn tile_round_trip(tier_index in 0usize..4, z_seed in 0u32..10_000) {
            let tier = ResolutionTier::ALL[tier_index];
            let f = tier.factor();
            // 512x512x256 native volume packed 16x16
            let layout = AtlasLayout::new(8192 / f, 8192 / f, 512 / f, 512 / f).unwrap();
            let z = z_seed % 256;
            let px = layout.pixel_offset(z);
            prop_assert_eq!(layout.z_of_pixel(px.x, px.y), z);
            let inner = layout.pixel_of(layout.tile_width() - 1, layout.tile_height() - 1, z);
            prop_assert_eq!(layout.locate(inner.x, inner.y).map(|v| v.z), Some(z));
        }
    }
}
