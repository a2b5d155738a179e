//! Atlas image decoding and segmentation atlas encoding.

use std::io::Cursor;

use glam::UVec2;
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};

/// Decodes an atlas image (PNG, JPEG, ...) into RGBA pixels.
///
/// # Errors
/// Returns an error if the bytes are not a supported image.
pub fn decode_atlas(bytes: &[u8]) -> RenderResult<RgbaImage> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    log::info!("decoded atlas image: {} x {}", rgba.width(), rgba.height());
    Ok(rgba)
}

/// Wraps raw RGBA bytes as an image.
///
/// # Errors
/// Returns [`RenderError::InvalidImageData`] if the length does not match.
pub fn rgba_image(width: u32, height: u32, data: Vec<u8>) -> RenderResult<RgbaImage> {
    ImageBuffer::from_raw(width, height, data).ok_or(RenderError::InvalidImageData)
}

/// Rasterizes coloured points into a transparent image of the given size.
/// Points outside the image are skipped.
pub fn rasterize_points(width: u32, height: u32, points: &[(UVec2, [u8; 3])]) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(width, height);
    for (px, rgb) in points {
        if px.x < width && px.y < height {
            img.put_pixel(px.x, px.y, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }
    }
    img
}

/// Encodes an image as PNG bytes.
///
/// # Errors
/// Returns an error if encoding fails.
pub fn encode_png(img: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
