//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME types accepted for import.
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Error types for image import.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The file's MIME type is not PNG or JPEG.
    #[error("Unsupported file type '{0}': please import a PNG or JPG image")]
    UnsupportedFileType(String),

    /// The file could not be read as an image.
    #[error("Could not load the image: {0}")]
    ImageDecodeFailure(String),
}

/// Raster formats the editor reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Map an accepted MIME type to a format.
    ///
    /// Matching ignores ASCII case and any `;`-separated parameters.
    pub fn from_mime(mime: &str) -> Result<Self, DecodeError> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
            _ => Err(DecodeError::UnsupportedFileType(mime.to_string())),
        }
    }

    /// Canonical MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Parse a short name such as `"png"`, `"jpg"` or `"jpeg"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}
