//! Rendering capability of the host device.

use sharevol_core::{Result, ViewerError};

/// Reports what the host can render.
pub trait RenderCapability {
    /// Largest supported 2D texture dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::NoRenderingCapability`] when the host cannot
    /// render at all.
    fn max_texture_dimension(&self) -> Result<u32>;
}

/// Queries the default wgpu adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpuCapability;

impl RenderCapability for GpuCapability {
    fn max_texture_dimension(&self) -> Result<u32> {
        Ok(sharevol_render::probe_max_texture_dimension()?)
    }
}

/// A fixed texture limit, for headless hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCapability(pub u32);

impl RenderCapability for FixedCapability {
    fn max_texture_dimension(&self) -> Result<u32> {
        if self.0 == 0 {
            return Err(ViewerError::NoRenderingCapability(
                "texture limit is zero".into(),
            ));
        }
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharevol_core::ErrorKind;

    #[test]
    fn test_fixed() {
        assert_eq!(FixedCapability(4096).max_texture_dimension().unwrap(), 4096);
        let err = FixedCapability(0).max_texture_dimension().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capability);
    }

    #[test]
    fn test_gpu_probe() {
        match GpuCapability.max_texture_dimension() {
            Ok(max) => assert!(max > 0),
            Err(e) => {
                eprintln!("Skipping GPU probe test: no GPU adapter available ({e})");
                assert_eq!(e.kind(), ErrorKind::Capability);
            }
        }
    }
}
