//! Errors returned by editor session intents.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::transform::{CropError, TransformError};

/// Any failure of an [`EditorSession`](crate::session::EditorSession) intent.
///
/// A failed intent never leaves committed state half-changed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Crop(#[from] CropError),

    /// The intent needs an image and none has been imported.
    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Contrast {0} is outside -100..=100")]
    ContrastOutOfRange(i32),

    #[error("Stroke width must be positive")]
    InvalidStrokeWidth,

    #[error("Invalid colour '{0}': expected #rrggbb")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_display_inner_message() {
        let err: EditorError = DecodeError::UnsupportedFileType("image/gif".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Unsupported file type 'image/gif': please import a PNG or JPG image"
        );

        let err: EditorError = TransformError::InvalidDimensions {
            width: 0,
            height: 4,
        }
        .into();
        assert!(err.to_string().contains("must be non-zero"));
    }

    #[test]
    fn test_session_error_messages() {
        assert_eq!(EditorError::NoImageLoaded.to_string(), "No image loaded");
        assert_eq!(
            EditorError::ContrastOutOfRange(150).to_string(),
            "Contrast 150 is outside -100..=100"
        );
    }
}
