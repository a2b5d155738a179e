//! Error types for sharevol-rs.

use thiserror::Error;

/// Coarse classification of a [`ViewerError`].
///
/// Hosts use this to decide how an error surfaces: capability errors show a
/// static message, data errors block with an alert and reset state, storage
/// errors are only logged, and network errors leave the viewer unrendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The host cannot render at all.
    Capability,
    /// Malformed scene, atlas or layout input.
    Data,
    /// Local session persistence failed.
    Storage,
    /// The atlas (or an import atlas) could not be fetched.
    Network,
    /// Local I/O failure.
    Io,
}

/// The main error type for sharevol-rs operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// No rendering capability is available on the host.
    #[error("no rendering capability available: {0}")]
    NoRenderingCapability(String),

    /// The atlas does not fit the device texture limit at any resolution tier.
    #[error("atlas of size {native} does not fit a {max_texture} texture at any resolution tier")]
    AtlasTooLarge { native: u32, max_texture: u32 },

    /// The atlas pixel dimensions do not evenly tile the voxel resolution.
    #[error("atlas {width}x{height} does not tile voxel resolution {res_x}x{res_y}")]
    MalformedAtlas {
        width: u32,
        height: u32,
        res_x: u32,
        res_y: u32,
    },

    /// An atlas image could not be decoded or encoded.
    #[error("invalid atlas image: {0}")]
    InvalidImage(String),

    /// A layout descriptor string could not be parsed.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// The scene description is malformed.
    #[error("invalid scene description: {0}")]
    InvalidScene(String),

    /// No intersection box with the given name exists.
    #[error("intersection box '{0}' not found")]
    UnknownBox(String),

    /// No brush label with the given name exists.
    #[error("brush label '{0}' not found")]
    UnknownLabel(String),

    /// A slice view index is out of range.
    #[error("slice view {0} does not exist")]
    UnknownView(usize),

    /// Session persistence failed.
    #[error("session storage error: {0}")]
    Storage(String),

    /// Fetching a resource failed.
    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewerError {
    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRenderingCapability(_) | Self::AtlasTooLarge { .. } => ErrorKind::Capability,
            Self::MalformedAtlas { .. }
            | Self::InvalidImage(_)
            | Self::InvalidLayout(_)
            | Self::InvalidScene(_)
            | Self::UnknownBox(_)
            | Self::UnknownLabel(_)
            | Self::UnknownView(_)
            | Self::Json(_) => ErrorKind::Data,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Fetch { .. } => ErrorKind::Network,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// A specialized Result type for sharevol-rs operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ViewerError::NoRenderingCapability("none".into()).kind(),
            ErrorKind::Capability
        );
        assert_eq!(
            ViewerError::MalformedAtlas {
                width: 10,
                height: 10,
                res_x: 3,
                res_y: 3
            }
            .kind(),
            ErrorKind::Data
        );
        assert_eq!(ViewerError::Storage("quota".into()).kind(), ErrorKind::Storage);
        assert_eq!(
            ViewerError::Fetch {
                url: "a".into(),
                reason: "b".into()
            }
            .kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn test_json_error_is_data() {
        let err: ViewerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
