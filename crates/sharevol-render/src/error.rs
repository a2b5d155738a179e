//! Rendering error types.

use sharevol_core::ViewerError;
use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No graphics adapter is available.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel data does not match the stated dimensions.
    #[error("invalid image data")]
    InvalidImageData,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for ViewerError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::AdapterCreationFailed => {
                ViewerError::NoRenderingCapability(err.to_string())
            }
            RenderError::Image(_) | RenderError::InvalidImageData => {
                ViewerError::InvalidImage(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharevol_core::ErrorKind;

    #[test]
    fn test_conversion_kinds() {
        let e: ViewerError = RenderError::AdapterCreationFailed.into();
        assert_eq!(e.kind(), ErrorKind::Capability);
        let e: ViewerError = RenderError::InvalidImageData.into();
        assert_eq!(e.kind(), ErrorKind::Data);
    }
}
