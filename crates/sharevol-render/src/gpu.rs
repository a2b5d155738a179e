//! wgpu adapter access for capability queries.

use crate::error::{RenderError, RenderResult};

/// Requests a headless adapter.
async fn request_adapter() -> RenderResult<wgpu::Adapter> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..wgpu::InstanceDescriptor::default()
    });
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(RenderError::AdapterCreationFailed)
}

/// Reads the largest 2D texture dimension supported by the default adapter.
///
/// # Errors
/// Returns [`RenderError::AdapterCreationFailed`] when no adapter exists.
pub fn probe_max_texture_dimension() -> RenderResult<u32> {
    let adapter = pollster::block_on(request_adapter())?;
    let info = adapter.get_info();
    let max = adapter.limits().max_texture_dimension_2d;
    log::info!("adapter '{}' ({:?}): max texture {max}", info.name, info.backend);
    Ok(max)
}
